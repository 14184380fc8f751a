// SPDX-FileCopyrightText: 2026 Haggle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Haggle configuration system.

use haggle_config::diagnostic::ConfigError;
use haggle_config::{load_and_validate_str, load_config_from_str};
use serial_test::serial;

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_haggle_config() {
    let toml = r#"
[client]
log_level = "debug"

[auth]
token = "tok-abc"
user_id = "u-42"

[rest]
base_url = "https://market.example/api"
timeout_secs = 15
max_retries = 1

[realtime]
url = "wss://market.example/ws/chat"
connect_timeout_secs = 5
typing_debounce_secs = 2
typing_expiry_secs = 5

[unread]
poll_interval_secs = 60
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.client.log_level, "debug");
    assert_eq!(config.auth.token.as_deref(), Some("tok-abc"));
    assert_eq!(config.auth.user_id.as_deref(), Some("u-42"));
    assert_eq!(config.rest.base_url, "https://market.example/api");
    assert_eq!(config.rest.timeout_secs, 15);
    assert_eq!(config.rest.max_retries, 1);
    assert_eq!(config.realtime.url, "wss://market.example/ws/chat");
    assert_eq!(config.realtime.connect_timeout_secs, 5);
    assert_eq!(config.unread.poll_interval_secs, 60);
}

/// Unknown field in [realtime] section is rejected.
#[test]
fn unknown_field_in_realtime_produces_error() {
    let toml = r#"
[realtime]
ur = "wss://market.example/ws"
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("ur"),
        "error should mention unknown field or the bad key, got: {err_str}"
    );
}

/// Missing optional sections use defaults without error.
#[test]
fn missing_optional_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert_eq!(config.client.log_level, "info");
    assert!(config.auth.token.is_none());
    assert!(config.auth.user_id.is_none());
    assert_eq!(config.rest.timeout_secs, 30);
    assert_eq!(config.rest.max_retries, 2);
    assert_eq!(config.realtime.typing_debounce_secs, 2);
    assert_eq!(config.realtime.typing_expiry_secs, 5);
    assert_eq!(config.unread.poll_interval_secs, 30);
}

/// Environment variable HAGGLE_REST_BASE_URL overrides rest.base_url.
#[test]
#[serial]
fn env_var_overrides_rest_base_url() {
    use figment::{
        Figment,
        providers::{Env, Serialized},
    };
    use haggle_config::model::HaggleConfig;

    // SAFETY: guarded by #[serial]; no other test mutates this variable.
    unsafe { std::env::set_var("HAGGLE_REST_BASE_URL", "https://override.example/api") };

    let config: HaggleConfig = Figment::new()
        .merge(Serialized::defaults(HaggleConfig::default()))
        .merge(Env::prefixed("HAGGLE_").map(|key| {
            key.as_str().replacen("rest_", "rest.", 1).into()
        }))
        .extract()
        .expect("env override should extract");

    unsafe { std::env::remove_var("HAGGLE_REST_BASE_URL") };

    assert_eq!(config.rest.base_url, "https://override.example/api");
}

/// Underscore-containing keys map correctly (auth.user_id, not auth.user.id).
#[test]
#[serial]
fn env_var_maps_underscore_keys() {
    use figment::{
        Figment,
        providers::{Env, Serialized},
    };
    use haggle_config::model::HaggleConfig;

    unsafe { std::env::set_var("HAGGLE_AUTH_USER_ID", "u-env") };

    let config: HaggleConfig = Figment::new()
        .merge(Serialized::defaults(HaggleConfig::default()))
        .merge(Env::prefixed("HAGGLE_").map(|key| {
            key.as_str().replacen("auth_", "auth.", 1).into()
        }))
        .extract()
        .expect("env override should extract");

    unsafe { std::env::remove_var("HAGGLE_AUTH_USER_ID") };

    assert_eq!(config.auth.user_id.as_deref(), Some("u-env"));
}

/// An explicit config file path loads without any XDG lookup.
#[test]
#[serial]
fn explicit_path_loads_file() {
    use std::io::Write;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("haggle.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(
        file,
        "[rest]\nbase_url = \"https://from-file.example/api\"\n"
    )
    .unwrap();

    let config = haggle_config::load_config_from_path(&path).unwrap();
    assert_eq!(config.rest.base_url, "https://from-file.example/api");
}

/// load_and_validate_str surfaces both parse and semantic errors.
#[test]
fn validate_str_reports_semantic_errors() {
    let toml = r#"
[unread]
poll_interval_secs = 1
"#;
    let errors = load_and_validate_str(toml).expect_err("interval below floor should fail");
    assert!(errors.iter().any(|e| matches!(
        e,
        ConfigError::Validation { message } if message.contains("poll_interval_secs")
    )));
}

/// A typo in a known section yields a did-you-mean suggestion.
#[test]
fn typo_yields_suggestion() {
    let toml = r#"
[rest]
timeout_sec = 10
"#;
    let errors = load_and_validate_str(toml).expect_err("typo should fail");
    assert!(errors.iter().any(|e| matches!(
        e,
        ConfigError::UnknownKey { suggestion, .. }
            if suggestion.as_deref() == Some("timeout_secs")
    )));
}
