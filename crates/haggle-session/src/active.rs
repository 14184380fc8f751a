// SPDX-FileCopyrightText: 2026 Haggle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The active conversation controller.
//!
//! Owns exactly one open conversation at a time: its message history, its
//! metadata, its typing state, and its live connection. Opening a new
//! conversation supersedes everything in flight for the previous one — a
//! generation counter makes sure a slow response for conversation A can
//! never mutate conversation B's state.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::{Mutex, mpsc};
use tokio::time::Instant;
use tracing::{debug, warn};

use haggle_core::error::HaggleError;
use haggle_core::traits::{ChatApi, ConnectionHandle, RealtimeConnector};
use haggle_core::types::{
    ChatKind, ConversationId, ListingRef, LiveEvent, LiveMessage, Message, Peer, UserId,
};

use crate::typing::TypingDebouncer;

/// State held for the one open conversation.
struct OpenState {
    id: ConversationId,
    kind: ChatKind,
    peer: Peer,
    listing: Option<ListingRef>,
    /// History order first, then live arrivals, never re-sorted across the
    /// two.
    messages: Vec<Message>,
    connection: Arc<dyn ConnectionHandle>,
    typing: TypingDebouncer,
    /// Receiver-side expiry for the peer's typing indicator, so a lost
    /// `typing: false` frame cannot pin "typing…" forever.
    peer_typing_until: Option<Instant>,
}

/// Controller for the currently open conversation.
pub struct ActiveConversation {
    api: Arc<dyn ChatApi>,
    connector: Arc<dyn RealtimeConnector>,
    me: UserId,
    typing_debounce: Duration,
    typing_expiry: Duration,
    /// Incremented by every `open`/`close`; in-flight work captures the
    /// value at entry and discards its results if it no longer matches.
    generation: AtomicU64,
    inner: Mutex<Option<OpenState>>,
}

impl ActiveConversation {
    pub fn new(
        api: Arc<dyn ChatApi>,
        connector: Arc<dyn RealtimeConnector>,
        me: UserId,
        typing_debounce: Duration,
        typing_expiry: Duration,
    ) -> Self {
        Self {
            api,
            connector,
            me,
            typing_debounce,
            typing_expiry,
            generation: AtomicU64::new(0),
            inner: Mutex::new(None),
        }
    }

    /// Opens `conversation`: tears down the previous connection, loads
    /// history page 1 with its metadata, opens a fresh live connection, and
    /// issues the server-side read receipt.
    ///
    /// Returns the live event stream for the session pump, or `Ok(None)`
    /// when a newer `open`/`close` superseded this one while its I/O was in
    /// flight (its results were discarded). REST failures leave the
    /// controller empty but usable; the caller may simply retry.
    pub async fn open(
        &self,
        conversation: &ConversationId,
    ) -> Result<Option<mpsc::Receiver<LiveEvent>>, HaggleError> {
        let my_generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        // Tear down whatever was open. The previous connection must reach
        // Closed before the next one opens.
        if let Some(prev) = self.inner.lock().await.take() {
            prev.typing.reset().await;
            prev.connection.disconnect().await;
        }

        // The history endpoint returns the page plus conversation metadata
        // (peer, listing context, kind) in one response.
        let history = self.api.message_history(conversation, 1).await?;
        if self.generation.load(Ordering::SeqCst) != my_generation {
            debug!(conversation = %conversation.0, "history response superseded, discarding");
            return Ok(None);
        }

        let live = self.connector.open(conversation).await?;
        if self.generation.load(Ordering::SeqCst) != my_generation {
            live.handle.disconnect().await;
            return Ok(None);
        }

        let mut messages = history.messages;
        for message in &mut messages {
            message.resolve_ownership(&self.me);
        }
        // History-vs-history ordering is by creation time; the sort is
        // stable so equal timestamps keep server order.
        messages.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        let typing = TypingDebouncer::new(live.handle.clone(), self.typing_debounce);
        {
            let mut inner = self.inner.lock().await;
            if self.generation.load(Ordering::SeqCst) != my_generation {
                drop(inner);
                live.handle.disconnect().await;
                return Ok(None);
            }
            *inner = Some(OpenState {
                id: conversation.clone(),
                kind: history.kind,
                peer: history.peer,
                listing: history.listing,
                messages,
                connection: live.handle.clone(),
                typing,
                peer_typing_until: None,
            });
        }

        // Everything shown is now read. A failure here is not worth
        // tearing the conversation down over; the periodic unread
        // reconciliation will catch up.
        if let Err(e) = self.api.mark_read(conversation).await {
            warn!(conversation = %conversation.0, error = %e, "mark-as-read failed on open");
        }

        Ok(Some(live.events))
    }

    /// Tears down the connection and clears all conversation state.
    /// Safe to call when nothing is open.
    pub async fn close(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(prev) = self.inner.lock().await.take() {
            prev.typing.reset().await;
            prev.connection.disconnect().await;
        }
    }

    /// Sends a chat message over the live connection.
    ///
    /// Empty or whitespace-only content is rejected locally with a
    /// [`HaggleError::Validation`] — no frame leaves, no state changes. No
    /// optimistic append either: the message enters the list when the
    /// server echoes it back.
    pub async fn send(&self, content: &str) -> Result<(), HaggleError> {
        if content.trim().is_empty() {
            return Err(HaggleError::Validation("message content is empty".into()));
        }
        let (connection, typing) = {
            let inner = self.inner.lock().await;
            match inner.as_ref() {
                Some(st) => (st.connection.clone(), st.typing.clone()),
                None => {
                    return Err(HaggleError::Validation("no conversation is open".into()));
                }
            }
        };
        // The message supersedes any pending typing signal.
        typing.reset().await;
        connection.send_message(content).await
    }

    /// Appends a live message in arrival order, deduplicating by id (a
    /// duplicate echo may still update the read flag). Ownership comes
    /// from sender identity, never from transport ordering.
    ///
    /// Returns whether the message was appended.
    pub async fn receive_live(&self, live: LiveMessage) -> bool {
        let mut inner = self.inner.lock().await;
        let Some(st) = inner.as_mut() else {
            return false;
        };
        if let Some(existing) = st.messages.iter_mut().find(|m| m.id == live.id) {
            if live.read {
                existing.read = true;
            }
            return false;
        }
        let message = live.into_message(st.id.clone(), &self.me);
        st.messages.push(message);
        true
    }

    /// Forwards an outbound typing signal, debounced to one frame per edge
    /// with the configured idle auto-clear.
    pub async fn set_typing(&self, is_typing: bool) {
        let typing = {
            let inner = self.inner.lock().await;
            match inner.as_ref() {
                Some(st) => st.typing.clone(),
                None => return,
            }
        };
        typing.set_typing(is_typing).await;
    }

    /// Records the peer's typing state with the receiver-side expiry
    /// window.
    pub async fn apply_peer_typing(&self, is_typing: bool) {
        let mut inner = self.inner.lock().await;
        if let Some(st) = inner.as_mut() {
            st.peer_typing_until = is_typing.then(|| Instant::now() + self.typing_expiry);
        }
    }

    /// Whether the peer is typing right now. Expires on its own after the
    /// configured window, independent of an explicit stop event.
    pub async fn is_peer_typing(&self) -> bool {
        let inner = self.inner.lock().await;
        inner
            .as_ref()
            .and_then(|st| st.peer_typing_until)
            .is_some_and(|until| Instant::now() < until)
    }

    /// Marks every held message as read (the peer's read receipt arrived).
    pub async fn mark_all_read(&self) {
        let mut inner = self.inner.lock().await;
        if let Some(st) = inner.as_mut() {
            for message in &mut st.messages {
                message.read = true;
            }
        }
    }

    /// Sends a read receipt over the live connection.
    pub async fn send_read_receipt(&self) -> Result<(), HaggleError> {
        let connection = {
            let inner = self.inner.lock().await;
            match inner.as_ref() {
                Some(st) => st.connection.clone(),
                None => return Ok(()),
            }
        };
        connection.mark_read().await
    }

    /// The open conversation's id, if any.
    pub async fn conversation_id(&self) -> Option<ConversationId> {
        self.inner.lock().await.as_ref().map(|st| st.id.clone())
    }

    /// Metadata of the open conversation: (kind, peer, listing).
    pub async fn metadata(&self) -> Option<(ChatKind, Peer, Option<ListingRef>)> {
        self.inner
            .lock()
            .await
            .as_ref()
            .map(|st| (st.kind, st.peer.clone(), st.listing.clone()))
    }

    /// Snapshot of the message list in display order.
    pub async fn messages(&self) -> Vec<Message> {
        self.inner
            .lock()
            .await
            .as_ref()
            .map(|st| st.messages.clone())
            .unwrap_or_default()
    }

    pub async fn is_open(&self) -> bool {
        self.inner.lock().await.is_some()
    }
}
