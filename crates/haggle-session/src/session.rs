// SPDX-FileCopyrightText: 2026 Haggle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The explicitly constructed chat session context.
//!
//! One `ChatSession` per logged-in user, created at login and torn down at
//! logout. It owns the directory, the active conversation controller, and
//! the unread badge, and it pumps live events from the open conversation's
//! connection into all three. Nothing here is process-global; the UI layer
//! receives the session by injection.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use haggle_config::model::HaggleConfig;
use haggle_core::error::HaggleError;
use haggle_core::traits::{ChatApi, RealtimeConnector};
use haggle_core::types::{
    Conversation, ConversationFilter, ConversationId, ListingKind, LiveEvent, Message, Preview,
    UserId,
};

use crate::active::ActiveConversation;
use crate::directory::SessionDirectory;
use crate::unread::UnreadBadge;

/// What the session surfaces to the UI layer, one per pumped live event.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A new message landed in the open conversation (already applied to
    /// the message list and the directory preview).
    MessageReceived(Message),
    /// The peer started or stopped typing.
    PeerTyping(bool),
    /// The peer read everything; the message list's read flags are updated.
    MessagesRead,
    /// A server-reported error worth a transient notice. The conversation
    /// stays open.
    TransientError(String),
    /// The live connection dropped. Shown as "connection lost"; reopening
    /// the conversation is the way back.
    ConnectionLost { reason: Option<String> },
}

/// A logged-in user's chat state: directory, active conversation, badge.
pub struct ChatSession {
    me: UserId,
    directory: SessionDirectory,
    active: ActiveConversation,
    unread: UnreadBadge,
    unread_poll: Duration,
    events: Option<mpsc::Receiver<LiveEvent>>,
    refresh_guard: Option<CancellationToken>,
}

impl ChatSession {
    /// Builds a session for `me` on top of the injected collaborators.
    pub fn new(
        api: Arc<dyn ChatApi>,
        connector: Arc<dyn RealtimeConnector>,
        me: UserId,
        config: &HaggleConfig,
    ) -> Self {
        let directory = SessionDirectory::new(api.clone(), me.clone());
        let active = ActiveConversation::new(
            api.clone(),
            connector,
            me.clone(),
            Duration::from_secs(config.realtime.typing_debounce_secs),
            Duration::from_secs(config.realtime.typing_expiry_secs),
        );
        let unread = UnreadBadge::new(api);
        Self {
            me,
            directory,
            active,
            unread,
            unread_poll: Duration::from_secs(config.unread.poll_interval_secs),
            events: None,
            refresh_guard: None,
        }
    }

    /// The logged-in user.
    pub fn user(&self) -> &UserId {
        &self.me
    }

    // --- Directory ---

    /// Refreshes the conversation list and reconciles the badge from it.
    pub async fn refresh_directory(
        &mut self,
        filter: ConversationFilter,
    ) -> Result<&[Conversation], HaggleError> {
        self.directory.list_conversations(filter).await?;
        self.unread.recompute_from_directory(&self.directory);
        Ok(self.directory.conversations())
    }

    pub fn conversations(&self) -> &[Conversation] {
        self.directory.conversations()
    }

    pub async fn start_product_chat(
        &self,
        listing_kind: ListingKind,
        listing_id: i64,
    ) -> Result<ConversationId, HaggleError> {
        self.directory.start_product_chat(listing_kind, listing_id).await
    }

    pub async fn start_direct_chat(
        &self,
        recipient: &UserId,
    ) -> Result<ConversationId, HaggleError> {
        self.directory.start_direct_chat(recipient).await
    }

    // --- Active conversation ---

    /// Opens a conversation and wires its live events into the session
    /// pump. Returns `false` when a concurrent open superseded this one.
    pub async fn open_conversation(
        &mut self,
        conversation: &ConversationId,
    ) -> Result<bool, HaggleError> {
        match self.active.open(conversation).await? {
            Some(events) => {
                self.events = Some(events);
                // Opening the conversation reads it, locally and (via the
                // controller's REST receipt) server-side.
                self.directory.mark_conversation_read(conversation);
                self.unread.recompute_from_directory(&self.directory);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Closes the open conversation, if any. Idempotent.
    pub async fn close_conversation(&mut self) {
        self.events = None;
        self.active.close().await;
    }

    pub async fn send(&self, content: &str) -> Result<(), HaggleError> {
        self.active.send(content).await
    }

    pub async fn set_typing(&self, is_typing: bool) {
        self.active.set_typing(is_typing).await;
    }

    pub async fn is_peer_typing(&self) -> bool {
        self.active.is_peer_typing().await
    }

    pub async fn messages(&self) -> Vec<Message> {
        self.active.messages().await
    }

    pub fn active(&self) -> &ActiveConversation {
        &self.active
    }

    // --- Unread badge ---

    pub fn unread_total(&self) -> u64 {
        self.unread.total()
    }

    pub fn unread(&self) -> &UnreadBadge {
        &self.unread
    }

    /// Starts the periodic badge reconciliation poll.
    pub fn start_unread_refresh(&mut self) {
        if self.refresh_guard.is_none() {
            self.refresh_guard = Some(self.unread.spawn_refresh_loop(self.unread_poll));
        }
    }

    // --- Event pump ---

    /// Pumps the next live event into session state and translates it for
    /// the UI. Returns `None` when no conversation is open or its stream
    /// ended.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        loop {
            let event = match self.events.as_mut() {
                Some(events) => events.recv().await,
                None => return None,
            };
            let Some(event) = event else {
                self.events = None;
                return None;
            };

            match event {
                // Internal to the connection lifecycle; the UI sees the
                // conversation as open already.
                LiveEvent::ConnectionEstablished => continue,

                LiveEvent::Message(live) => {
                    let Some(conversation) = self.active.conversation_id().await else {
                        continue;
                    };
                    if !self.active.receive_live(live.clone()).await {
                        // Duplicate echo; already held.
                        continue;
                    }
                    metrics::counter!("haggle_session_messages_received").increment(1);
                    let message = live.into_message(conversation.clone(), &self.me);
                    self.directory.apply_incoming_event(
                        &conversation,
                        Preview {
                            content: message.content.clone(),
                            timestamp: message.created_at,
                        },
                        // The conversation is on screen, so it does not go
                        // unread locally; the receipt below tells the server.
                        0,
                    );
                    if !message.is_own {
                        let _ = self.active.send_read_receipt().await;
                    }
                    self.unread.recompute_from_directory(&self.directory);
                    return Some(SessionEvent::MessageReceived(message));
                }

                LiveEvent::Typing { is_typing } => {
                    self.active.apply_peer_typing(is_typing).await;
                    return Some(SessionEvent::PeerTyping(is_typing));
                }

                LiveEvent::MessagesRead => {
                    self.active.mark_all_read().await;
                    return Some(SessionEvent::MessagesRead);
                }

                LiveEvent::Error { message } => {
                    return Some(SessionEvent::TransientError(message));
                }

                LiveEvent::ConnectionClosed { reason } => {
                    self.events = None;
                    return Some(SessionEvent::ConnectionLost { reason });
                }
            }
        }
    }

    /// Logout teardown: stops the badge poll and closes the conversation.
    pub async fn shutdown(&mut self) {
        if let Some(guard) = self.refresh_guard.take() {
            guard.cancel();
        }
        self.close_conversation().await;
    }
}
