// SPDX-FileCopyrightText: 2026 Haggle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lifecycle of a single live conversation socket.
//!
//! [`Connection::open`] spawns a driver task that dials the endpoint, pumps
//! inbound frames into an event channel, and drains an outbound frame queue.
//! The handle side never touches the socket; it talks to the driver through
//! channels, so a connection can be torn down from any call site without
//! sharing the socket object.
//!
//! A `Closed` connection is terminal. Reconnecting means asking the
//! connector for a fresh instance; nothing here resurrects a dead socket.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use haggle_config::model::RealtimeConfig;
use haggle_core::error::HaggleError;
use haggle_core::traits::{ConnectionHandle, CredentialProvider, LiveConnection, RealtimeConnector};
use haggle_core::types::{ConnectionState, ConversationId, LiveEvent};

use crate::frames::{InboundFrame, OutboundFrame};

/// Outbound frames queued while the socket is still opening.
const OUTBOUND_QUEUE: usize = 64;

/// Inbound events buffered ahead of the session's event pump.
const EVENT_QUEUE: usize = 128;

/// Handle to one live conversation socket.
pub struct Connection {
    conversation_id: ConversationId,
    outbound_tx: mpsc::Sender<OutboundFrame>,
    state_rx: watch::Receiver<ConnectionState>,
    cancel: CancellationToken,
}

impl Connection {
    /// Dials `url` in a background driver task and returns the handle plus
    /// the inbound event stream.
    ///
    /// The returned handle starts in `Idle`/`Connecting`; it reaches `Open`
    /// only once the server acknowledges with `connection_established`.
    /// Dial failures are not returned here — they surface on the event
    /// stream as [`LiveEvent::ConnectionClosed`], the same way a later
    /// network drop would.
    pub fn open(
        url: String,
        connect_timeout: Duration,
        conversation_id: ConversationId,
    ) -> (Self, mpsc::Receiver<LiveEvent>) {
        let (events_tx, events_rx) = mpsc::channel(EVENT_QUEUE);
        let (outbound_tx, outbound_rx) = mpsc::channel(OUTBOUND_QUEUE);
        let (state_tx, state_rx) = watch::channel(ConnectionState::Idle);
        let cancel = CancellationToken::new();

        tokio::spawn(drive(
            url,
            connect_timeout,
            conversation_id.clone(),
            state_tx,
            events_tx,
            outbound_rx,
            cancel.clone(),
        ));

        (
            Self {
                conversation_id,
                outbound_tx,
                state_rx,
                cancel,
            },
            events_rx,
        )
    }

    /// The conversation this connection is bound to.
    pub fn conversation_id(&self) -> &ConversationId {
        &self.conversation_id
    }
}

#[async_trait]
impl ConnectionHandle for Connection {
    async fn send_message(&self, content: &str) -> Result<(), HaggleError> {
        if self.state() == ConnectionState::Closed {
            return Err(HaggleError::Transport {
                message: "message not sent, connection lost".into(),
                source: None,
            });
        }
        self.outbound_tx
            .send(OutboundFrame::ChatMessage {
                content: content.to_string(),
            })
            .await
            .map_err(|_| HaggleError::Transport {
                message: "message not sent, connection lost".into(),
                source: None,
            })
    }

    async fn send_typing(&self, is_typing: bool) -> Result<(), HaggleError> {
        if self.state() != ConnectionState::Open {
            debug!(
                conversation = %self.conversation_id.0,
                "dropping typing frame, connection not open"
            );
            return Ok(());
        }
        // Losing a typing edge is harmless; never surface it.
        let _ = self.outbound_tx.try_send(OutboundFrame::Typing { is_typing });
        Ok(())
    }

    async fn mark_read(&self) -> Result<(), HaggleError> {
        self.outbound_tx
            .send(OutboundFrame::MarkRead)
            .await
            .map_err(|_| HaggleError::Transport {
                message: "read receipt not sent, connection lost".into(),
                source: None,
            })
    }

    fn state(&self) -> ConnectionState {
        *self.state_rx.borrow()
    }

    async fn disconnect(&self) {
        self.cancel.cancel();
        // Wait for the driver to acknowledge teardown so that callers
        // observe Closed before they open a successor connection.
        let mut rx = self.state_rx.clone();
        while *rx.borrow() != ConnectionState::Closed {
            if rx.changed().await.is_err() {
                break;
            }
        }
    }
}

/// Driver task: dial, handshake, then pump frames both ways until the
/// socket drops or the token is cancelled.
async fn drive(
    url: String,
    connect_timeout: Duration,
    conversation_id: ConversationId,
    state_tx: watch::Sender<ConnectionState>,
    events_tx: mpsc::Sender<LiveEvent>,
    mut outbound_rx: mpsc::Receiver<OutboundFrame>,
    cancel: CancellationToken,
) {
    state_tx.send_replace(ConnectionState::Connecting);

    let dial = tokio::time::timeout(connect_timeout, tokio_tungstenite::connect_async(&url));
    let ws = tokio::select! {
        _ = cancel.cancelled() => {
            debug!(conversation = %conversation_id.0, "pending open cancelled");
            state_tx.send_replace(ConnectionState::Closed);
            let _ = events_tx.send(LiveEvent::ConnectionClosed { reason: None }).await;
            return;
        }
        dialed = dial => match dialed {
            Ok(Ok((ws, _response))) => ws,
            Ok(Err(e)) => {
                metrics::counter!("haggle_realtime_connect_failures").increment(1);
                warn!(conversation = %conversation_id.0, error = %e, "socket dial failed");
                state_tx.send_replace(ConnectionState::Closed);
                let _ = events_tx
                    .send(LiveEvent::ConnectionClosed { reason: Some(e.to_string()) })
                    .await;
                return;
            }
            Err(_elapsed) => {
                metrics::counter!("haggle_realtime_connect_failures").increment(1);
                warn!(conversation = %conversation_id.0, "socket dial timed out");
                state_tx.send_replace(ConnectionState::Closed);
                let _ = events_tx
                    .send(LiveEvent::ConnectionClosed { reason: Some("connect timed out".into()) })
                    .await;
                return;
            }
        }
    };

    metrics::counter!("haggle_realtime_connections_opened").increment(1);
    let (mut sink, mut stream) = ws.split();
    let mut close_reason: Option<String> = None;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!(conversation = %conversation_id.0, "connection cancelled");
                break;
            }
            Some(frame) = outbound_rx.recv() => {
                let text = match serde_json::to_string(&frame) {
                    Ok(t) => t,
                    Err(e) => {
                        warn!(error = %e, "failed to serialize outbound frame");
                        continue;
                    }
                };
                if sink.send(WsMessage::Text(text.into())).await.is_err() {
                    close_reason = Some("send failed".into());
                    break;
                }
                metrics::counter!("haggle_realtime_frames_sent").increment(1);
            }
            inbound = stream.next() => match inbound {
                Some(Ok(WsMessage::Text(text))) => {
                    metrics::counter!("haggle_realtime_frames_received").increment(1);
                    let frame = match serde_json::from_str::<InboundFrame>(&text) {
                        Ok(f) => f,
                        Err(e) => {
                            warn!(error = %e, "unrecognized inbound frame");
                            continue;
                        }
                    };
                    if matches!(frame, InboundFrame::ConnectionEstablished) {
                        state_tx.send_replace(ConnectionState::Open);
                    }
                    if events_tx.send(frame.into_event()).await.is_err() {
                        // Consumer went away; nothing left to deliver to.
                        break;
                    }
                }
                Some(Ok(WsMessage::Close(frame))) => {
                    close_reason = frame.map(|f| f.reason.to_string());
                    break;
                }
                Some(Ok(_)) => {} // Ignore binary; ping/pong handled by tungstenite.
                Some(Err(e)) => {
                    close_reason = Some(e.to_string());
                    break;
                }
                None => {
                    close_reason = Some("connection closed by server".into());
                    break;
                }
            }
        }
    }

    let _ = sink.close().await;
    state_tx.send_replace(ConnectionState::Closed);
    let _ = events_tx
        .send(LiveEvent::ConnectionClosed {
            reason: close_reason,
        })
        .await;
    debug!(conversation = %conversation_id.0, "connection driver exited");
}

/// Opens live connections against the configured socket endpoint, passing a
/// fresh credential in the connect URL each time.
pub struct WsConnector {
    config: RealtimeConfig,
    credentials: Arc<dyn CredentialProvider>,
}

impl WsConnector {
    pub fn new(config: RealtimeConfig, credentials: Arc<dyn CredentialProvider>) -> Self {
        Self {
            config,
            credentials,
        }
    }
}

#[async_trait]
impl RealtimeConnector for WsConnector {
    async fn open(&self, conversation: &ConversationId) -> Result<LiveConnection, HaggleError> {
        let token = self.credentials.bearer_token().await?;
        let url = format!(
            "{}/{}/?token={}",
            self.config.url.trim_end_matches('/'),
            conversation.0,
            token
        );
        let (connection, events) = Connection::open(
            url,
            Duration::from_secs(self.config.connect_timeout_secs),
            conversation.clone(),
        );
        Ok(LiveConnection {
            handle: Arc::new(connection),
            events,
        })
    }
}
