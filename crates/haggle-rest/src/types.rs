// SPDX-FileCopyrightText: 2026 Haggle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire DTOs for the chat REST resource and their conversions into core
//! types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use haggle_core::types::{
    ChatKind, Conversation, ConversationId, ConversationPage, HistoryPage, ListingKind,
    ListingRef, Message, MessageId, Peer, Preview, StartedChat, UserId,
};

// --- Request bodies ---

/// `POST /chat/product/start/`
#[derive(Debug, Clone, Serialize)]
pub struct StartProductChatRequest {
    pub listing_type: ListingKind,
    pub listing_id: i64,
}

/// `POST /chat/direct/start/`
#[derive(Debug, Clone, Serialize)]
pub struct StartDirectChatRequest {
    pub recipient_id: String,
}

/// `POST /chat/{id}/send/`
#[derive(Debug, Clone, Serialize)]
pub struct SendMessageRequest {
    pub content: String,
}

// --- Response bodies ---

/// A user as represented by the REST resource.
#[derive(Debug, Clone, Deserialize)]
pub struct UserDto {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

impl From<UserDto> for Peer {
    fn from(dto: UserDto) -> Self {
        Peer {
            id: UserId(dto.id),
            display_name: dto.display_name,
            avatar_url: dto.avatar,
        }
    }
}

/// The listing attached to a product chat.
#[derive(Debug, Clone, Deserialize)]
pub struct ListingDto {
    pub id: i64,
    pub listing_type: ListingKind,
    pub title: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
}

impl From<ListingDto> for ListingRef {
    fn from(dto: ListingDto) -> Self {
        ListingRef {
            id: dto.id,
            kind: dto.listing_type,
            title: dto.title,
            thumbnail_url: dto.thumbnail,
            price: dto.price,
        }
    }
}

/// Last-message preview in a chat summary.
#[derive(Debug, Clone, Deserialize)]
pub struct LastMessageDto {
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// One conversation summary in the directory listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatSummaryDto {
    pub chat_id: String,
    pub chat_type: ChatKind,
    pub other_user: UserDto,
    #[serde(default)]
    pub listing: Option<ListingDto>,
    #[serde(default)]
    pub last_message: Option<LastMessageDto>,
    #[serde(default)]
    pub unread_count: u32,
}

impl From<ChatSummaryDto> for Conversation {
    fn from(dto: ChatSummaryDto) -> Self {
        Conversation {
            id: ConversationId(dto.chat_id),
            kind: dto.chat_type,
            peer: dto.other_user.into(),
            listing: dto.listing.map(Into::into),
            last_message: dto.last_message.map(|m| Preview {
                content: m.content,
                timestamp: m.created_at,
            }),
            unread_count: dto.unread_count,
        }
    }
}

/// `GET /chat/?type=…`
#[derive(Debug, Clone, Deserialize)]
pub struct ChatListResponse {
    pub chats: Vec<ChatSummaryDto>,
    pub total_count: u32,
    pub product_chats: u32,
    pub direct_chats: u32,
}

impl From<ChatListResponse> for ConversationPage {
    fn from(dto: ChatListResponse) -> Self {
        ConversationPage {
            chats: dto.chats.into_iter().map(Into::into).collect(),
            total_count: dto.total_count,
            product_chats: dto.product_chats,
            direct_chats: dto.direct_chats,
        }
    }
}

/// `POST /chat/{product,direct}/start/`
#[derive(Debug, Clone, Deserialize)]
pub struct StartChatResponse {
    pub chat_id: String,
    pub created: bool,
    pub recipient: UserDto,
}

impl From<StartChatResponse> for StartedChat {
    fn from(dto: StartChatResponse) -> Self {
        StartedChat {
            id: ConversationId(dto.chat_id),
            created: dto.created,
            recipient: dto.recipient.into(),
        }
    }
}

/// One message in a history page or send response.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageDto {
    pub id: String,
    pub sender: UserDto,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub is_read: bool,
}

impl MessageDto {
    /// Binds the message to its conversation. Ownership (`is_own`) is
    /// resolved by the session layer, which knows the current user.
    pub fn into_message(self, conversation: ConversationId) -> Message {
        Message {
            id: MessageId(self.id),
            conversation_id: conversation,
            sender_id: UserId(self.sender.id),
            sender_name: self.sender.display_name,
            content: self.content,
            created_at: self.created_at,
            read: self.is_read,
            is_own: false,
        }
    }
}

/// `GET /chat/{id}/messages/?page=N`
#[derive(Debug, Clone, Deserialize)]
pub struct MessageHistoryResponse {
    pub chat_id: String,
    pub chat_type: ChatKind,
    pub other_user: UserDto,
    #[serde(default)]
    pub listing: Option<ListingDto>,
    pub messages: Vec<MessageDto>,
}

impl From<MessageHistoryResponse> for HistoryPage {
    fn from(dto: MessageHistoryResponse) -> Self {
        let conversation = ConversationId(dto.chat_id);
        HistoryPage {
            conversation_id: conversation.clone(),
            kind: dto.chat_type,
            peer: dto.other_user.into(),
            listing: dto.listing.map(Into::into),
            messages: dto
                .messages
                .into_iter()
                .map(|m| m.into_message(conversation.clone()))
                .collect(),
        }
    }
}

/// `GET /chat/unread/`
#[derive(Debug, Clone, Deserialize)]
pub struct UnreadCountResponse {
    pub total_unread: u64,
}

/// Structured error body the resource returns on 4xx/5xx.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

/// Machine-readable error detail.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(default)]
    pub code: Option<String>,
    pub message: String,
}
