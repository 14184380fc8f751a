// SPDX-FileCopyrightText: 2026 Haggle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Haggle chat client.

use thiserror::Error;

/// The primary error type used across the chat core.
#[derive(Debug, Error)]
pub enum HaggleError {
    /// No valid credential is available; the user must re-authenticate.
    #[error("authentication required")]
    AuthRequired,

    /// Attempt to start a conversation with oneself.
    #[error("cannot start a chat with yourself")]
    SelfChat,

    /// A REST call failed (connection refused, timeout, 5xx). Retryable;
    /// never corrupts state already held locally.
    #[error("network error: {message}")]
    Network {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A live-socket failure (dial error, dropped connection, send on a
    /// closed connection). Non-fatal to the rest of the session.
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Input rejected locally before any network call (empty message, bad id).
    #[error("validation error: {0}")]
    Validation(String),

    /// Configuration errors (invalid TOML, missing required fields).
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl HaggleError {
    /// Whether the caller may usefully retry the failed operation as-is.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            HaggleError::Network { .. } | HaggleError::Transport { .. }
        )
    }
}
