// SPDX-FileCopyrightText: 2026 Haggle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as URL schemes and non-zero timing windows.

use crate::diagnostic::ConfigError;
use crate::model::HaggleConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &HaggleConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let base_url = config.rest.base_url.trim();
    if base_url.is_empty() {
        errors.push(ConfigError::Validation {
            message: "rest.base_url must not be empty".to_string(),
        });
    } else if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        errors.push(ConfigError::Validation {
            message: format!("rest.base_url `{base_url}` must start with http:// or https://"),
        });
    }

    if config.rest.timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "rest.timeout_secs must be at least 1".to_string(),
        });
    }

    if config.rest.max_retries > 10 {
        errors.push(ConfigError::Validation {
            message: format!(
                "rest.max_retries must be at most 10, got {}",
                config.rest.max_retries
            ),
        });
    }

    let ws_url = config.realtime.url.trim();
    if ws_url.is_empty() {
        errors.push(ConfigError::Validation {
            message: "realtime.url must not be empty".to_string(),
        });
    } else if !ws_url.starts_with("ws://") && !ws_url.starts_with("wss://") {
        errors.push(ConfigError::Validation {
            message: format!("realtime.url `{ws_url}` must start with ws:// or wss://"),
        });
    }

    if config.realtime.connect_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "realtime.connect_timeout_secs must be at least 1".to_string(),
        });
    }

    if config.realtime.typing_debounce_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "realtime.typing_debounce_secs must be at least 1".to_string(),
        });
    }

    if config.realtime.typing_expiry_secs < config.realtime.typing_debounce_secs {
        errors.push(ConfigError::Validation {
            message: format!(
                "realtime.typing_expiry_secs ({}) must not be shorter than typing_debounce_secs ({})",
                config.realtime.typing_expiry_secs, config.realtime.typing_debounce_secs
            ),
        });
    }

    if config.unread.poll_interval_secs < 5 {
        errors.push(ConfigError::Validation {
            message: format!(
                "unread.poll_interval_secs must be at least 5, got {}",
                config.unread.poll_interval_secs
            ),
        });
    }

    if let Some(ref token) = config.auth.token
        && token.trim().is_empty()
    {
        errors.push(ConfigError::Validation {
            message: "auth.token must not be empty when set".to_string(),
        });
    }

    if let Some(ref user_id) = config.auth.user_id
        && user_id.trim().is_empty()
    {
        errors.push(ConfigError::Validation {
            message: "auth.user_id must not be empty when set".to_string(),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
