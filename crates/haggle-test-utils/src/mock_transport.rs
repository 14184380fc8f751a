// SPDX-FileCopyrightText: 2026 Haggle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock realtime transport for deterministic testing.
//!
//! `MockConnector` hands out `MockConnection`s that capture outbound frames
//! and accept injected live events. It also watches for overlapping open
//! connections, so tests can assert the single-active-connection invariant.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc, watch};

use haggle_core::error::HaggleError;
use haggle_core::traits::{ConnectionHandle, LiveConnection, RealtimeConnector};
use haggle_core::types::{ConnectionState, ConversationId, LiveEvent};

/// An outbound frame captured by a mock connection.
#[derive(Debug, Clone, PartialEq)]
pub enum SentFrame {
    Message(String),
    Typing(bool),
    MarkRead,
}

/// A mock live connection: captures sends, accepts injected events.
pub struct MockConnection {
    conversation: ConversationId,
    state_tx: watch::Sender<ConnectionState>,
    sent: Mutex<Vec<SentFrame>>,
    events_tx: mpsc::Sender<LiveEvent>,
    fail_sends: AtomicBool,
}

impl MockConnection {
    fn new(conversation: ConversationId, events_tx: mpsc::Sender<LiveEvent>) -> Self {
        let (state_tx, _state_rx) = watch::channel(ConnectionState::Open);
        Self {
            conversation,
            state_tx,
            sent: Mutex::new(Vec::new()),
            events_tx,
            fail_sends: AtomicBool::new(false),
        }
    }

    /// The conversation this connection was opened for.
    pub fn conversation(&self) -> &ConversationId {
        &self.conversation
    }

    /// Delivers a live event to the connection's consumer, as the server
    /// would.
    pub async fn inject(&self, event: LiveEvent) {
        let _ = self.events_tx.send(event).await;
    }

    /// Frames captured so far, in send order.
    pub async fn sent_frames(&self) -> Vec<SentFrame> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    /// Makes subsequent message sends fail as if the connection dropped.
    pub fn fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    /// Simulates a network drop: closes the connection and notifies the
    /// consumer.
    pub async fn simulate_drop(&self, reason: &str) {
        self.state_tx.send_replace(ConnectionState::Closed);
        let _ = self
            .events_tx
            .send(LiveEvent::ConnectionClosed {
                reason: Some(reason.to_string()),
            })
            .await;
    }
}

#[async_trait]
impl ConnectionHandle for MockConnection {
    async fn send_message(&self, content: &str) -> Result<(), HaggleError> {
        if self.fail_sends.load(Ordering::SeqCst) || self.state() == ConnectionState::Closed {
            return Err(HaggleError::Transport {
                message: "message not sent, connection lost".into(),
                source: None,
            });
        }
        self.sent
            .lock()
            .await
            .push(SentFrame::Message(content.to_string()));
        Ok(())
    }

    async fn send_typing(&self, is_typing: bool) -> Result<(), HaggleError> {
        if self.state() != ConnectionState::Open {
            return Ok(());
        }
        self.sent.lock().await.push(SentFrame::Typing(is_typing));
        Ok(())
    }

    async fn mark_read(&self) -> Result<(), HaggleError> {
        if self.state() == ConnectionState::Closed {
            return Err(HaggleError::Transport {
                message: "read receipt not sent, connection lost".into(),
                source: None,
            });
        }
        self.sent.lock().await.push(SentFrame::MarkRead);
        Ok(())
    }

    fn state(&self) -> ConnectionState {
        *self.state_tx.borrow()
    }

    async fn disconnect(&self) {
        if self.state() == ConnectionState::Closed {
            return;
        }
        self.state_tx.send_replace(ConnectionState::Closed);
        let _ = self
            .events_tx
            .send(LiveEvent::ConnectionClosed { reason: None })
            .await;
    }
}

/// Hands out mock connections and records every open.
pub struct MockConnector {
    opened: Mutex<Vec<Arc<MockConnection>>>,
    overlap: AtomicBool,
    fail_opens: AtomicBool,
}

impl MockConnector {
    pub fn new() -> Self {
        Self {
            opened: Mutex::new(Vec::new()),
            overlap: AtomicBool::new(false),
            fail_opens: AtomicBool::new(false),
        }
    }

    /// Makes subsequent opens fail with a transport error.
    pub fn fail_opens(&self, fail: bool) {
        self.fail_opens.store(fail, Ordering::SeqCst);
    }

    /// Every connection opened so far, oldest first.
    pub async fn opened(&self) -> Vec<Arc<MockConnection>> {
        self.opened.lock().await.clone()
    }

    /// The most recently opened connection.
    pub async fn last(&self) -> Option<Arc<MockConnection>> {
        self.opened.lock().await.last().cloned()
    }

    pub async fn open_count(&self) -> usize {
        self.opened.lock().await.len()
    }

    /// True if an open was requested while a previous connection was still
    /// not closed — a violation of the single-active-connection invariant.
    pub fn overlap_detected(&self) -> bool {
        self.overlap.load(Ordering::SeqCst)
    }
}

impl Default for MockConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RealtimeConnector for MockConnector {
    async fn open(&self, conversation: &ConversationId) -> Result<LiveConnection, HaggleError> {
        if self.fail_opens.load(Ordering::SeqCst) {
            return Err(HaggleError::Transport {
                message: "mock open failure".into(),
                source: None,
            });
        }

        let mut opened = self.opened.lock().await;
        if opened
            .iter()
            .any(|c| c.state() != ConnectionState::Closed)
        {
            self.overlap.store(true, Ordering::SeqCst);
        }

        let (events_tx, events_rx) = mpsc::channel(64);
        let connection = Arc::new(MockConnection::new(conversation.clone(), events_tx));
        // The mock server acknowledges immediately.
        let _ = connection
            .events_tx
            .try_send(LiveEvent::ConnectionEstablished);
        opened.push(connection.clone());

        Ok(LiveConnection {
            handle: connection,
            events: events_rx,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn captures_frames_in_order() {
        let connector = MockConnector::new();
        let live = connector
            .open(&ConversationId("c-1".into()))
            .await
            .unwrap();

        live.handle.send_message("hi").await.unwrap();
        live.handle.send_typing(true).await.unwrap();
        live.handle.mark_read().await.unwrap();

        let conn = connector.last().await.unwrap();
        assert_eq!(
            conn.sent_frames().await,
            vec![
                SentFrame::Message("hi".into()),
                SentFrame::Typing(true),
                SentFrame::MarkRead
            ]
        );
    }

    #[tokio::test]
    async fn detects_overlapping_opens() {
        let connector = MockConnector::new();
        let _a = connector.open(&ConversationId("a".into())).await.unwrap();
        let _b = connector.open(&ConversationId("b".into())).await.unwrap();
        assert!(connector.overlap_detected());
    }

    #[tokio::test]
    async fn no_overlap_when_closed_first() {
        let connector = MockConnector::new();
        let a = connector.open(&ConversationId("a".into())).await.unwrap();
        a.handle.disconnect().await;
        let _b = connector.open(&ConversationId("b".into())).await.unwrap();
        assert!(!connector.overlap_detected());
    }

    #[tokio::test]
    async fn injected_events_reach_the_consumer() {
        let connector = MockConnector::new();
        let mut live = connector.open(&ConversationId("c".into())).await.unwrap();

        assert_eq!(
            live.events.recv().await,
            Some(LiveEvent::ConnectionEstablished)
        );

        let conn = connector.last().await.unwrap();
        conn.inject(LiveEvent::MessagesRead).await;
        assert_eq!(live.events.recv().await, Some(LiveEvent::MessagesRead));
    }
}
