// SPDX-FileCopyrightText: 2026 Haggle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for the Haggle workspace.
//!
//! In-memory implementations of the core seams, for session-level tests
//! that need deterministic control over REST responses and live events.

pub mod mock_api;
pub mod mock_transport;

pub use mock_api::{ApiCall, MockChatApi, empty_history, peer};
pub use mock_transport::{MockConnection, MockConnector, SentFrame};
