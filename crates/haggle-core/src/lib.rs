// SPDX-FileCopyrightText: 2026 Haggle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Haggle chat client.
//!
//! This crate provides the foundational trait definitions, error types, and
//! common types used throughout the Haggle workspace: the REST resource
//! seam, the live-socket seam, and the credential supplier seam the session
//! layer is written against.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::HaggleError;
pub use traits::{
    ChatApi, ConnectionHandle, CredentialProvider, LiveConnection, RealtimeConnector, StaticToken,
};
pub use types::{
    ChatKind, ConnectionState, Conversation, ConversationFilter, ConversationId, ConversationPage,
    HistoryPage, ListingKind, ListingRef, LiveEvent, LiveMessage, Message, MessageId, Peer,
    Preview, StartedChat, UserId,
};
