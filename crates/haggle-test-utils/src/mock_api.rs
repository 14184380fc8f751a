// SPDX-FileCopyrightText: 2026 Haggle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock chat REST resource for deterministic testing.
//!
//! `MockChatApi` implements [`ChatApi`] with programmable responses,
//! recorded calls for assertions, and per-conversation gates that hold a
//! history fetch until released (for stale-response tests).

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use haggle_core::error::HaggleError;
use haggle_core::traits::ChatApi;
use haggle_core::types::{
    ChatKind, ConversationFilter, ConversationId, ConversationPage, HistoryPage, ListingKind,
    Message, MessageId, Peer, StartedChat, UserId,
};

/// A recorded call against the mock resource.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    ListConversations(ConversationFilter),
    StartProductChat(ListingKind, i64),
    StartDirectChat(UserId),
    MessageHistory(ConversationId, u32),
    SendMessage(ConversationId, String),
    MarkRead(ConversationId),
    UnreadCount,
}

#[derive(Default)]
struct MockApiState {
    page: ConversationPage,
    history: HashMap<String, HistoryPage>,
    started: HashMap<String, StartedChat>,
    unread_total: u64,
    fail_list: bool,
    fail_history: bool,
    direct_start_self_chat: bool,
    calls: Vec<ApiCall>,
}

/// A programmable in-memory chat resource.
pub struct MockChatApi {
    state: Mutex<MockApiState>,
    history_gates: Mutex<HashMap<String, Arc<Notify>>>,
}

impl MockChatApi {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockApiState::default()),
            history_gates: Mutex::new(HashMap::new()),
        }
    }

    /// Sets the directory page returned by `list_conversations`.
    pub async fn set_conversations(&self, page: ConversationPage) {
        self.state.lock().await.page = page;
    }

    /// Sets the history page returned for a conversation.
    pub async fn set_history(&self, page: HistoryPage) {
        self.state
            .lock()
            .await
            .history
            .insert(page.conversation_id.0.clone(), page);
    }

    /// Registers the conversation a start call resolves to. The first call
    /// reports `created = true`, subsequent ones `created = false`,
    /// mirroring the server's idempotent start-or-get.
    pub async fn set_started(&self, key: &str, started: StartedChat) {
        self.state
            .lock()
            .await
            .started
            .insert(key.to_string(), started);
    }

    pub async fn set_unread_total(&self, total: u64) {
        self.state.lock().await.unread_total = total;
    }

    /// Makes `list_conversations` fail with a network error.
    pub async fn fail_list(&self, fail: bool) {
        self.state.lock().await.fail_list = fail;
    }

    /// Makes `message_history` fail with a network error.
    pub async fn fail_history(&self, fail: bool) {
        self.state.lock().await.fail_history = fail;
    }

    /// Makes `start_direct_chat` fail with the server-side self-chat error.
    pub async fn direct_start_self_chat(&self, fail: bool) {
        self.state.lock().await.direct_start_self_chat = fail;
    }

    /// Holds the next `message_history` call for `conversation` until the
    /// returned notify is triggered. Simulates a slow in-flight fetch.
    pub async fn gate_history(&self, conversation: &ConversationId) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.history_gates
            .lock()
            .await
            .insert(conversation.0.clone(), gate.clone());
        gate
    }

    /// All calls recorded so far, in order.
    pub async fn calls(&self) -> Vec<ApiCall> {
        self.state.lock().await.calls.clone()
    }

    /// Count of recorded calls matching `pred`.
    pub async fn call_count(&self, pred: impl Fn(&ApiCall) -> bool) -> usize {
        self.state.lock().await.calls.iter().filter(|c| pred(c)).count()
    }
}

impl Default for MockChatApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatApi for MockChatApi {
    async fn list_conversations(
        &self,
        filter: ConversationFilter,
    ) -> Result<ConversationPage, HaggleError> {
        let mut state = self.state.lock().await;
        state.calls.push(ApiCall::ListConversations(filter));
        if state.fail_list {
            return Err(HaggleError::Network {
                message: "mock list failure".into(),
                source: None,
            });
        }
        Ok(state.page.clone())
    }

    async fn start_product_chat(
        &self,
        listing_kind: ListingKind,
        listing_id: i64,
    ) -> Result<StartedChat, HaggleError> {
        let mut state = self.state.lock().await;
        state
            .calls
            .push(ApiCall::StartProductChat(listing_kind, listing_id));
        let key = format!("{listing_kind}:{listing_id}");
        start_or_get(&mut state, &key)
    }

    async fn start_direct_chat(&self, recipient: &UserId) -> Result<StartedChat, HaggleError> {
        let mut state = self.state.lock().await;
        state.calls.push(ApiCall::StartDirectChat(recipient.clone()));
        if state.direct_start_self_chat {
            return Err(HaggleError::SelfChat);
        }
        let key = format!("direct:{}", recipient.0);
        start_or_get(&mut state, &key)
    }

    async fn message_history(
        &self,
        conversation: &ConversationId,
        page: u32,
    ) -> Result<HistoryPage, HaggleError> {
        // Honor a gate, if one was registered, before touching state.
        let gate = self
            .history_gates
            .lock()
            .await
            .remove(&conversation.0);
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let mut state = self.state.lock().await;
        state
            .calls
            .push(ApiCall::MessageHistory(conversation.clone(), page));
        if state.fail_history {
            return Err(HaggleError::Network {
                message: "mock history failure".into(),
                source: None,
            });
        }
        state
            .history
            .get(&conversation.0)
            .cloned()
            .ok_or_else(|| HaggleError::Network {
                message: format!("no mock history for conversation {}", conversation.0),
                source: None,
            })
    }

    async fn send_message(
        &self,
        conversation: &ConversationId,
        content: &str,
    ) -> Result<Message, HaggleError> {
        let mut state = self.state.lock().await;
        state
            .calls
            .push(ApiCall::SendMessage(conversation.clone(), content.into()));
        Ok(Message {
            id: MessageId(format!("mock-{}", uuid::Uuid::new_v4())),
            conversation_id: conversation.clone(),
            sender_id: UserId("mock-sender".into()),
            sender_name: "Mock".into(),
            content: content.to_string(),
            created_at: chrono::Utc::now(),
            read: false,
            is_own: false,
        })
    }

    async fn mark_read(&self, conversation: &ConversationId) -> Result<(), HaggleError> {
        let mut state = self.state.lock().await;
        state.calls.push(ApiCall::MarkRead(conversation.clone()));
        Ok(())
    }

    async fn unread_count(&self) -> Result<u64, HaggleError> {
        let mut state = self.state.lock().await;
        state.calls.push(ApiCall::UnreadCount);
        Ok(state.unread_total)
    }
}

fn start_or_get(state: &mut MockApiState, key: &str) -> Result<StartedChat, HaggleError> {
    match state.started.get_mut(key) {
        Some(started) => {
            let result = started.clone();
            // Subsequent calls return the same conversation, not a new one.
            started.created = false;
            Ok(result)
        }
        None => Err(HaggleError::Network {
            message: format!("no mock start registered for {key}"),
            source: None,
        }),
    }
}

/// Builds a peer with the given id.
pub fn peer(id: &str, name: &str) -> Peer {
    Peer {
        id: UserId(id.into()),
        display_name: name.into(),
        avatar_url: None,
    }
}

/// Builds an empty direct-chat history page for a conversation.
pub fn empty_history(conversation: &str, peer_id: &str) -> HistoryPage {
    HistoryPage {
        conversation_id: ConversationId(conversation.into()),
        kind: ChatKind::Direct,
        peer: peer(peer_id, "Peer"),
        listing: None,
        messages: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn start_or_get_flips_created_flag() {
        let api = MockChatApi::new();
        api.set_started(
            "job:42",
            StartedChat {
                id: ConversationId("7".into()),
                created: true,
                recipient: peer("u-2", "Sam"),
            },
        )
        .await;

        let first = api.start_product_chat(ListingKind::Job, 42).await.unwrap();
        let second = api.start_product_chat(ListingKind::Job, 42).await.unwrap();
        assert!(first.created);
        assert!(!second.created);
        assert_eq!(first.id, second.id);
    }

    #[tokio::test]
    async fn gated_history_waits_for_release() {
        let api = Arc::new(MockChatApi::new());
        let conv = ConversationId("7".into());
        api.set_history(empty_history("7", "u-2")).await;
        let gate = api.gate_history(&conv).await;

        let api_clone = api.clone();
        let conv_clone = conv.clone();
        let fetch = tokio::spawn(async move {
            api_clone.message_history(&conv_clone, 1).await
        });

        // The fetch is parked on the gate; no call recorded yet.
        tokio::task::yield_now().await;
        assert_eq!(api.calls().await.len(), 0);

        gate.notify_one();
        let page = fetch.await.unwrap().unwrap();
        assert_eq!(page.conversation_id, conv);
    }
}
