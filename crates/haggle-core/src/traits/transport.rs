// SPDX-FileCopyrightText: 2026 Haggle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The live-socket seam between the session layer and the wire transport.
//!
//! One connection per open conversation. Inbound traffic arrives as a
//! channel of [`LiveEvent`]s drained by the session's event pump; outbound
//! frames are fire-and-forget methods on the handle.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::error::HaggleError;
use crate::types::{ConnectionState, ConversationId, LiveEvent};

/// A live connection bound to one conversation: the control handle plus
/// the inbound event stream.
pub struct LiveConnection {
    pub handle: Arc<dyn ConnectionHandle>,
    pub events: mpsc::Receiver<LiveEvent>,
}

/// Control surface of an open (or opening) connection.
///
/// The handle never owns the consumer's view of the socket; dropping it
/// does not tear the connection down. Teardown is explicit via
/// [`ConnectionHandle::disconnect`], which is idempotent and also cancels
/// a connection that has not finished opening.
#[async_trait]
pub trait ConnectionHandle: Send + Sync + 'static {
    /// Queues a chat message frame. Fire-and-forget; delivery is confirmed
    /// only by the server echoing the message back as a live event.
    async fn send_message(&self, content: &str) -> Result<(), HaggleError>;

    /// Queues a typing indicator frame. Dropped silently if the connection
    /// is not open; a lost typing edge is harmless.
    async fn send_typing(&self, is_typing: bool) -> Result<(), HaggleError>;

    /// Queues a read-receipt frame for everything received so far.
    async fn mark_read(&self) -> Result<(), HaggleError>;

    /// Current lifecycle state.
    fn state(&self) -> ConnectionState;

    /// Releases the underlying socket. Safe to call repeatedly and safe to
    /// call before the connection has finished opening.
    async fn disconnect(&self);
}

/// Opens live connections. Implemented by the wire transport and by test
/// doubles.
#[async_trait]
pub trait RealtimeConnector: Send + Sync + 'static {
    /// Opens a connection bound to `conversation`, authenticating with a
    /// freshly supplied credential.
    async fn open(&self, conversation: &ConversationId) -> Result<LiveConnection, HaggleError>;
}
