// SPDX-FileCopyrightText: 2026 Haggle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session state for the Haggle chat core.
//!
//! The pieces, leaves first: [`ActiveConversation`] bridges REST history
//! with live events for the one open conversation; [`SessionDirectory`]
//! owns the conversation list; [`UnreadBadge`] aggregates unread counts;
//! [`ChatSession`] composes them into the per-login context handed to the
//! UI layer.

pub mod active;
pub mod directory;
pub mod session;
pub mod typing;
pub mod unread;

pub use active::ActiveConversation;
pub use directory::SessionDirectory;
pub use session::{ChatSession, SessionEvent};
pub use typing::TypingDebouncer;
pub use unread::UnreadBadge;
