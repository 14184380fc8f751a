// SPDX-FileCopyrightText: 2026 Haggle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wiring from configuration to the chat core's collaborators.

use std::sync::Arc;

use haggle_config::model::HaggleConfig;
use haggle_core::error::HaggleError;
use haggle_core::traits::{ChatApi, CredentialProvider, RealtimeConnector, StaticToken};
use haggle_core::types::UserId;
use haggle_realtime::WsConnector;
use haggle_rest::RestChatApi;
use haggle_session::ChatSession;

/// The configured credential, or a pointer at how to set one.
pub fn credentials(config: &HaggleConfig) -> Result<Arc<dyn CredentialProvider>, HaggleError> {
    let token = config.auth.token.clone().ok_or_else(|| {
        HaggleError::Config(
            "auth.token is required. Set it in haggle.toml or via HAGGLE_AUTH_TOKEN".into(),
        )
    })?;
    Ok(Arc::new(StaticToken(token)))
}

/// The logged-in user's id, required for ownership and self-chat guards.
pub fn current_user(config: &HaggleConfig) -> Result<UserId, HaggleError> {
    config
        .auth
        .user_id
        .clone()
        .map(UserId)
        .ok_or_else(|| {
            HaggleError::Config(
                "auth.user_id is required. Set it in haggle.toml or via HAGGLE_AUTH_USER_ID"
                    .into(),
            )
        })
}

/// Builds the REST client from configuration.
pub fn build_api(config: &HaggleConfig) -> Result<Arc<dyn ChatApi>, HaggleError> {
    let creds = credentials(config)?;
    Ok(Arc::new(RestChatApi::new(&config.rest, creds)?))
}

/// Builds a full chat session: REST client, socket connector, and state.
pub fn build_session(config: &HaggleConfig) -> Result<ChatSession, HaggleError> {
    let creds = credentials(config)?;
    let api: Arc<dyn ChatApi> = Arc::new(RestChatApi::new(&config.rest, creds.clone())?);
    let connector: Arc<dyn RealtimeConnector> =
        Arc::new(WsConnector::new(config.realtime.clone(), creds));
    Ok(ChatSession::new(
        api,
        connector,
        current_user(config)?,
        config,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_auth() -> HaggleConfig {
        let mut config = HaggleConfig::default();
        config.auth.token = Some("tok".into());
        config.auth.user_id = Some("u-1".into());
        config
    }

    #[test]
    fn missing_token_is_a_config_error() {
        let config = HaggleConfig::default();
        assert!(matches!(
            credentials(&config),
            Err(HaggleError::Config(_))
        ));
    }

    #[test]
    fn missing_user_id_is_a_config_error() {
        let mut config = HaggleConfig::default();
        config.auth.token = Some("tok".into());
        assert!(matches!(
            current_user(&config),
            Err(HaggleError::Config(_))
        ));
    }

    #[test]
    fn full_session_builds_from_complete_config() {
        let config = config_with_auth();
        assert!(build_session(&config).is_ok());
    }
}
