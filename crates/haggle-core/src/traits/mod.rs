// SPDX-FileCopyrightText: 2026 Haggle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Seam traits between the session layer and its collaborators.

pub mod api;
pub mod credentials;
pub mod transport;

pub use api::ChatApi;
pub use credentials::{CredentialProvider, StaticToken};
pub use transport::{ConnectionHandle, LiveConnection, RealtimeConnector};
