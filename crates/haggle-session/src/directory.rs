// SPDX-FileCopyrightText: 2026 Haggle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The REST-sourced conversation directory.
//!
//! The directory is the only owner of the conversation summaries. It is
//! mutated from exactly two places: wholesale replacement by a REST fetch,
//! and in-place preview/unread patches via [`SessionDirectory::apply_incoming_event`]
//! fed by the live transport. No other writer exists, so partial concurrent
//! mutations cannot lose updates.

use std::sync::Arc;

use tracing::debug;

use haggle_core::error::HaggleError;
use haggle_core::traits::ChatApi;
use haggle_core::types::{
    Conversation, ConversationFilter, ConversationId, ListingKind, Preview, UserId,
};

/// The authoritative, REST-sourced list of the user's conversations.
pub struct SessionDirectory {
    api: Arc<dyn ChatApi>,
    me: UserId,
    conversations: Vec<Conversation>,
    total_count: u32,
    product_chats: u32,
    direct_chats: u32,
}

impl SessionDirectory {
    pub fn new(api: Arc<dyn ChatApi>, me: UserId) -> Self {
        Self {
            api,
            me,
            conversations: Vec::new(),
            total_count: 0,
            product_chats: 0,
            direct_chats: 0,
        }
    }

    /// Fetches the directory with `filter` and replaces the local list
    /// wholesale. On failure the existing list is preserved and the error
    /// surfaced to the caller.
    pub async fn list_conversations(
        &mut self,
        filter: ConversationFilter,
    ) -> Result<&[Conversation], HaggleError> {
        let page = self.api.list_conversations(filter).await?;
        self.conversations = page.chats;
        self.total_count = page.total_count;
        self.product_chats = page.product_chats;
        self.direct_chats = page.direct_chats;
        Ok(&self.conversations)
    }

    /// The currently held conversation summaries.
    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    /// Per-kind counts from the last fetch: (total, product, direct).
    pub fn counts(&self) -> (u32, u32, u32) {
        (self.total_count, self.product_chats, self.direct_chats)
    }

    /// Starts (or fetches) the conversation about a listing. The server
    /// guarantees idempotency: the same pair yields the same id.
    pub async fn start_product_chat(
        &self,
        listing_kind: ListingKind,
        listing_id: i64,
    ) -> Result<ConversationId, HaggleError> {
        let started = self.api.start_product_chat(listing_kind, listing_id).await?;
        Ok(started.id)
    }

    /// Starts (or fetches) a direct conversation. Chatting with oneself is
    /// short-circuited locally as a usability guard; the server remains the
    /// authority and enforces the same rule.
    pub async fn start_direct_chat(
        &self,
        recipient: &UserId,
    ) -> Result<ConversationId, HaggleError> {
        if recipient == &self.me {
            return Err(HaggleError::SelfChat);
        }
        let started = self.api.start_direct_chat(recipient).await?;
        Ok(started.id)
    }

    /// Patches one conversation's preview and unread count in place,
    /// without a refetch. A no-op when the conversation is not held
    /// locally; the next full refresh will pick it up.
    pub fn apply_incoming_event(
        &mut self,
        conversation: &ConversationId,
        preview: Preview,
        delta_unread: u32,
    ) {
        let Some(conv) = self
            .conversations
            .iter_mut()
            .find(|c| &c.id == conversation)
        else {
            debug!(
                conversation = %conversation.0,
                "incoming event for unknown conversation, deferring to next refresh"
            );
            return;
        };
        conv.last_message = Some(preview);
        conv.unread_count = conv.unread_count.saturating_add(delta_unread);
    }

    /// Zeroes one conversation's unread count locally. The server-side
    /// read receipt is the active conversation controller's job.
    pub fn mark_conversation_read(&mut self, conversation: &ConversationId) {
        if let Some(conv) = self
            .conversations
            .iter_mut()
            .find(|c| &c.id == conversation)
        {
            conv.unread_count = 0;
        }
    }

    /// Total unread across the directory. Always recomputed from the
    /// per-conversation counts, never cached, so it cannot drift.
    pub fn total_unread(&self) -> u64 {
        self.conversations
            .iter()
            .map(|c| u64::from(c.unread_count))
            .sum()
    }
}
