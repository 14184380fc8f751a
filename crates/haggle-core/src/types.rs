// SPDX-FileCopyrightText: 2026 Haggle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared across the chat core.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Unique identifier for a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub String);

/// Unique identifier for a message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

/// Unique identifier for a user account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

/// The two conversation topologies.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ChatKind {
    /// Anchored to a specific listing.
    Product,
    /// Freeform user-to-user.
    Direct,
}

/// The listing categories a product chat can reference.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ListingKind {
    Job,
    Property,
}

/// Filter applied when listing conversations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum ConversationFilter {
    All,
    Product,
    Direct,
}

/// The other participant in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Peer {
    pub id: UserId,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

/// The listing a product chat is anchored to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingRef {
    pub id: i64,
    pub kind: ListingKind,
    pub title: String,
    pub thumbnail_url: Option<String>,
    /// Preformatted display price; absent for listings without one.
    pub price: Option<String>,
}

/// Last-message preview shown in the conversation list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preview {
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// A conversation summary as held by the session directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    pub kind: ChatKind,
    pub peer: Peer,
    /// Present iff `kind` is [`ChatKind::Product`].
    pub listing: Option<ListingRef>,
    pub last_message: Option<Preview>,
    pub unread_count: u32,
}

/// A single message within a conversation.
///
/// Never mutated after creation except for the `read` flag. Within a
/// conversation, messages are totally ordered by `created_at` and the
/// client never reorders them for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    pub sender_id: UserId,
    pub sender_name: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub read: bool,
    /// Whether the current user authored this message. Derived by sender
    /// identity comparison, never by transport ordering.
    pub is_own: bool,
}

impl Message {
    /// Sets `is_own` by comparing the sender against the current user.
    pub fn resolve_ownership(&mut self, me: &UserId) {
        self.is_own = &self.sender_id == me;
    }
}

/// A message as delivered over the live socket. The conversation id is
/// implied by the connection it arrived on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveMessage {
    pub id: MessageId,
    pub sender_id: UserId,
    pub sender_name: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub read: bool,
}

impl LiveMessage {
    /// Promotes a live frame into a [`Message`] bound to its conversation.
    pub fn into_message(self, conversation_id: ConversationId, me: &UserId) -> Message {
        let is_own = &self.sender_id == me;
        Message {
            id: self.id,
            conversation_id,
            sender_id: self.sender_id,
            sender_name: self.sender_name,
            content: self.content,
            created_at: self.created_at,
            read: self.read,
            is_own,
        }
    }
}

/// Events a live connection delivers to its consumer, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum LiveEvent {
    /// Handshake acknowledged; the connection is now open.
    ConnectionEstablished,
    /// A message in this conversation, from either party.
    Message(LiveMessage),
    /// The remote party started or stopped typing.
    Typing { is_typing: bool },
    /// The remote party read everything sent so far.
    MessagesRead,
    /// A server-reported error. Non-fatal; the connection stays up.
    Error { message: String },
    /// The connection closed (locally or by the network). Terminal.
    ConnectionClosed { reason: Option<String> },
}

/// Lifecycle states of a live connection.
///
/// `Closed` is terminal for an instance; reconnecting means constructing
/// a fresh connection, never resurrecting a closed one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Idle,
    Connecting,
    Open,
    Closed,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionState::Idle => write!(f, "idle"),
            ConnectionState::Connecting => write!(f, "connecting"),
            ConnectionState::Open => write!(f, "open"),
            ConnectionState::Closed => write!(f, "closed"),
        }
    }
}

/// Response to a "start or get" conversation request.
#[derive(Debug, Clone, PartialEq)]
pub struct StartedChat {
    pub id: ConversationId,
    /// False when the conversation already existed (idempotent start).
    pub created: bool,
    pub recipient: Peer,
}

/// One page of the conversation directory.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConversationPage {
    pub chats: Vec<Conversation>,
    pub total_count: u32,
    pub product_chats: u32,
    pub direct_chats: u32,
}

/// One page of a conversation's message history plus its metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryPage {
    pub conversation_id: ConversationId,
    pub kind: ChatKind,
    pub peer: Peer,
    pub listing: Option<ListingRef>,
    /// Oldest first within the page, ordered by creation time.
    pub messages: Vec<Message>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn chat_kind_round_trips_as_snake_case() {
        assert_eq!(ChatKind::Product.to_string(), "product");
        assert_eq!(ChatKind::from_str("direct").unwrap(), ChatKind::Direct);
        let json = serde_json::to_string(&ChatKind::Product).unwrap();
        assert_eq!(json, "\"product\"");
    }

    #[test]
    fn listing_kind_round_trips() {
        assert_eq!(ListingKind::Job.to_string(), "job");
        assert_eq!(
            ListingKind::from_str("property").unwrap(),
            ListingKind::Property
        );
    }

    #[test]
    fn conversation_filter_display() {
        assert_eq!(ConversationFilter::All.to_string(), "all");
        assert_eq!(ConversationFilter::Product.to_string(), "product");
        assert_eq!(ConversationFilter::Direct.to_string(), "direct");
    }

    #[test]
    fn ownership_is_derived_from_sender_identity() {
        let me = UserId("u-1".into());
        let live = LiveMessage {
            id: MessageId("m-1".into()),
            sender_id: UserId("u-1".into()),
            sender_name: "Me".into(),
            content: "hello".into(),
            created_at: Utc::now(),
            read: false,
        };
        let msg = live.into_message(ConversationId("c-1".into()), &me);
        assert!(msg.is_own);

        let mut from_peer = msg.clone();
        from_peer.sender_id = UserId("u-2".into());
        from_peer.resolve_ownership(&me);
        assert!(!from_peer.is_own);
    }

    #[test]
    fn connection_state_display() {
        assert_eq!(ConnectionState::Idle.to_string(), "idle");
        assert_eq!(ConnectionState::Connecting.to_string(), "connecting");
        assert_eq!(ConnectionState::Open.to_string(), "open");
        assert_eq!(ConnectionState::Closed.to_string(), "closed");
    }
}
