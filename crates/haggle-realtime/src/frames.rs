// SPDX-FileCopyrightText: 2026 Haggle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tagged JSON frames exchanged over a live conversation socket.
//!
//! Client -> Server:
//! ```json
//! {"type": "chat_message", "content": "hello"}
//! {"type": "typing", "is_typing": true}
//! {"type": "mark_read"}
//! ```
//!
//! Server -> Client:
//! ```json
//! {"type": "connection_established"}
//! {"type": "chat_message", "id": "m-1", "content": "hi", "sender_id": "u-2",
//!  "sender_name": "Sam", "created_at": "2026-03-01T10:00:00Z", "is_read": false}
//! {"type": "typing", "is_typing": false}
//! {"type": "messages_read"}
//! {"type": "error", "message": "…"}
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use haggle_core::types::{LiveEvent, LiveMessage, MessageId, UserId};

/// Frames the client sends. All fire-and-forget; none are acknowledged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundFrame {
    ChatMessage { content: String },
    Typing { is_typing: bool },
    MarkRead,
}

/// Frames the server sends, dispatched by tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundFrame {
    ConnectionEstablished,
    ChatMessage {
        id: String,
        content: String,
        sender_id: String,
        sender_name: String,
        created_at: DateTime<Utc>,
        #[serde(default)]
        is_read: bool,
    },
    Typing {
        is_typing: bool,
    },
    MessagesRead,
    Error {
        message: String,
    },
}

impl InboundFrame {
    /// Translates a wire frame into the session layer's vocabulary.
    pub fn into_event(self) -> LiveEvent {
        match self {
            InboundFrame::ConnectionEstablished => LiveEvent::ConnectionEstablished,
            InboundFrame::ChatMessage {
                id,
                content,
                sender_id,
                sender_name,
                created_at,
                is_read,
            } => LiveEvent::Message(LiveMessage {
                id: MessageId(id),
                sender_id: UserId(sender_id),
                sender_name,
                content,
                created_at,
                read: is_read,
            }),
            InboundFrame::Typing { is_typing } => LiveEvent::Typing { is_typing },
            InboundFrame::MessagesRead => LiveEvent::MessagesRead,
            InboundFrame::Error { message } => LiveEvent::Error { message },
        }
    }
}
