// SPDX-FileCopyrightText: 2026 Haggle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Haggle chat client.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so unrecognized keys are
//! rejected at startup with an actionable diagnostic.

use serde::{Deserialize, Serialize};

/// Top-level Haggle configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HaggleConfig {
    /// Client identity and logging.
    #[serde(default)]
    pub client: ClientConfig,

    /// Credential used by the CLI. Real applications inject their own
    /// credential provider instead.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Chat REST resource settings.
    #[serde(default)]
    pub rest: RestConfig,

    /// Live socket settings.
    #[serde(default)]
    pub realtime: RealtimeConfig,

    /// Unread badge settings.
    #[serde(default)]
    pub unread: UnreadConfig,
}

/// Client identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Static credential configuration for the CLI.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// Bearer token. `None` means the CLI cannot authenticate.
    #[serde(default)]
    pub token: Option<String>,

    /// The current user's account id, used for ownership resolution and
    /// the self-chat guard.
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Chat REST resource configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RestConfig {
    /// Base URL of the marketplace API, without the `/chat` suffix.
    #[serde(default = "default_rest_base_url")]
    pub base_url: String,

    /// Per-request deadline, in seconds.
    #[serde(default = "default_rest_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries on transient statuses (429/5xx) before giving up.
    #[serde(default = "default_rest_max_retries")]
    pub max_retries: u32,
}

impl Default for RestConfig {
    fn default() -> Self {
        Self {
            base_url: default_rest_base_url(),
            timeout_secs: default_rest_timeout_secs(),
            max_retries: default_rest_max_retries(),
        }
    }
}

fn default_rest_base_url() -> String {
    "http://localhost:8000/api".to_string()
}

fn default_rest_timeout_secs() -> u64 {
    30
}

fn default_rest_max_retries() -> u32 {
    2
}

/// Live socket configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RealtimeConfig {
    /// Socket endpoint; the conversation id and credential are appended at
    /// connect time.
    #[serde(default = "default_realtime_url")]
    pub url: String,

    /// Deadline for the dial plus handshake, in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Sender-side idle window before a typing indicator auto-clears.
    #[serde(default = "default_typing_debounce_secs")]
    pub typing_debounce_secs: u64,

    /// Receiver-side window after which a peer's typing indicator expires
    /// without an explicit stop event.
    #[serde(default = "default_typing_expiry_secs")]
    pub typing_expiry_secs: u64,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            url: default_realtime_url(),
            connect_timeout_secs: default_connect_timeout_secs(),
            typing_debounce_secs: default_typing_debounce_secs(),
            typing_expiry_secs: default_typing_expiry_secs(),
        }
    }
}

fn default_realtime_url() -> String {
    "ws://localhost:8000/ws/chat".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_typing_debounce_secs() -> u64 {
    2
}

fn default_typing_expiry_secs() -> u64 {
    5
}

/// Unread badge configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct UnreadConfig {
    /// Interval of the reconciliation poll against the count endpoint.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

impl Default for UnreadConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

fn default_poll_interval_secs() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = HaggleConfig::default();
        assert_eq!(config.client.log_level, "info");
        assert_eq!(config.rest.timeout_secs, 30);
        assert_eq!(config.rest.max_retries, 2);
        assert_eq!(config.realtime.typing_debounce_secs, 2);
        assert_eq!(config.realtime.typing_expiry_secs, 5);
        assert_eq!(config.unread.poll_interval_secs, 30);
        assert!(config.auth.token.is_none());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = r#"
[rest]
base_url = "https://market.example/api"
"#;
        let config: HaggleConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.rest.base_url, "https://market.example/api");
        assert_eq!(config.rest.timeout_secs, 30);
        assert_eq!(config.realtime.typing_debounce_secs, 2);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let toml_str = r#"
[rest]
base_uri = "https://market.example/api"
"#;
        assert!(toml::from_str::<HaggleConfig>(toml_str).is_err());
    }
}
