// SPDX-FileCopyrightText: 2026 Haggle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credential supplier trait for REST and socket authentication.
//!
//! Token refresh is the provider's concern, not the chat core's: the REST
//! client asks for a bearer token per request, and the realtime transport
//! asks for a fresh one at socket-open time.

use async_trait::async_trait;

use crate::error::HaggleError;

/// Supplies a currently-valid bearer credential.
///
/// Implementations are expected to refresh expired tokens transparently
/// and to return [`HaggleError::AuthRequired`] once re-authentication is
/// unavoidable.
#[async_trait]
pub trait CredentialProvider: Send + Sync + 'static {
    /// Returns a bearer token valid at the time of the call.
    async fn bearer_token(&self) -> Result<String, HaggleError>;
}

/// A fixed token, for CLI use and tests. Never refreshes.
pub struct StaticToken(pub String);

#[async_trait]
impl CredentialProvider for StaticToken {
    async fn bearer_token(&self) -> Result<String, HaggleError> {
        if self.0.is_empty() {
            return Err(HaggleError::AuthRequired);
        }
        Ok(self.0.clone())
    }
}
