// SPDX-FileCopyrightText: 2026 Haggle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./haggle.toml` > `~/.config/haggle/haggle.toml` > `/etc/haggle/haggle.toml`
//! with environment variable overrides via `HAGGLE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::HaggleConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/haggle/haggle.toml` (system-wide)
/// 3. `~/.config/haggle/haggle.toml` (user XDG config)
/// 4. `./haggle.toml` (local directory)
/// 5. `HAGGLE_*` environment variables
pub fn load_config() -> Result<HaggleConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(HaggleConfig::default()))
        .merge(Toml::file("/etc/haggle/haggle.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("haggle/haggle.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("haggle.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and for callers that supply their own TOML.
pub fn load_config_from_str(toml_content: &str) -> Result<HaggleConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(HaggleConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<HaggleConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(HaggleConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `HAGGLE_AUTH_USER_ID` must map to
/// `auth.user_id`, not `auth.user.id`.
fn env_provider() -> Env {
    Env::prefixed("HAGGLE_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: HAGGLE_REST_BASE_URL -> "rest_base_url"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("client_", "client.", 1)
            .replacen("auth_", "auth.", 1)
            .replacen("rest_", "rest.", 1)
            .replacen("realtime_", "realtime.", 1)
            .replacen("unread_", "unread.", 1);
        mapped.into()
    })
}
