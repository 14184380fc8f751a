// SPDX-FileCopyrightText: 2026 Haggle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The chat REST resource, as consumed by the session layer.

use async_trait::async_trait;

use crate::error::HaggleError;
use crate::types::{
    ConversationFilter, ConversationId, ConversationPage, HistoryPage, ListingKind, Message,
    StartedChat, UserId,
};

/// The server-side chat resource.
///
/// All operations suspend on I/O and surface failures through the
/// [`HaggleError`] taxonomy; none of them panic past the call boundary.
#[async_trait]
pub trait ChatApi: Send + Sync + 'static {
    /// Fetches the conversation directory, optionally filtered by kind.
    async fn list_conversations(
        &self,
        filter: ConversationFilter,
    ) -> Result<ConversationPage, HaggleError>;

    /// Starts (or fetches the existing) conversation about a listing.
    ///
    /// Idempotent on the server: repeated calls for the same listing/user
    /// pair return the same conversation id with `created = false`.
    async fn start_product_chat(
        &self,
        listing_kind: ListingKind,
        listing_id: i64,
    ) -> Result<StartedChat, HaggleError>;

    /// Starts (or fetches the existing) direct conversation with a user.
    async fn start_direct_chat(&self, recipient: &UserId) -> Result<StartedChat, HaggleError>;

    /// Fetches one page of message history plus conversation metadata.
    /// Pages are 1-based; page 1 is the most recent.
    async fn message_history(
        &self,
        conversation: &ConversationId,
        page: u32,
    ) -> Result<HistoryPage, HaggleError>;

    /// REST fallback send path. The realtime socket is the primary path;
    /// this exists for callers without a live connection.
    async fn send_message(
        &self,
        conversation: &ConversationId,
        content: &str,
    ) -> Result<Message, HaggleError>;

    /// Marks every message in the conversation as read, server-side.
    async fn mark_read(&self, conversation: &ConversationId) -> Result<(), HaggleError>;

    /// The user's total unread count, from the dedicated badge endpoint.
    async fn unread_count(&self) -> Result<u64, HaggleError>;
}
