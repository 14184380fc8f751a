// SPDX-FileCopyrightText: 2026 Haggle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the chat REST resource.
//!
//! Provides [`RestChatApi`], which handles request construction, bearer
//! authentication, transient-error retry, and mapping of error responses
//! into the [`HaggleError`] taxonomy.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use haggle_config::model::RestConfig;
use haggle_core::error::HaggleError;
use haggle_core::traits::{ChatApi, CredentialProvider};
use haggle_core::types::{
    ConversationFilter, ConversationId, ConversationPage, HistoryPage, ListingKind, Message,
    StartedChat, UserId,
};

use crate::types::{
    ApiErrorResponse, ChatListResponse, MessageDto, MessageHistoryResponse, SendMessageRequest,
    StartChatResponse, StartDirectChatRequest, StartProductChatRequest, UnreadCountResponse,
};

/// Client for the marketplace chat REST resource.
///
/// Retries transient statuses (429/5xx) a bounded number of times with a
/// linear backoff; every request carries a freshly supplied bearer token so
/// the credential provider can rotate tokens between calls.
#[derive(Clone)]
pub struct RestChatApi {
    client: reqwest::Client,
    base_url: String,
    credentials: Arc<dyn CredentialProvider>,
    max_retries: u32,
}

impl RestChatApi {
    /// Creates a new REST client from configuration.
    pub fn new(
        config: &RestConfig,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Result<Self, HaggleError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| HaggleError::Network {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credentials,
            max_retries: config.max_retries,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Sends one request, retrying transient statuses up to `max_retries`
    /// times. Connection-level failures are returned immediately as
    /// [`HaggleError::Network`]; the caller decides whether to retry those.
    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<T, HaggleError> {
        let url = self.endpoint(path);
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, url = %url, "retrying chat API request after transient error");
                tokio::time::sleep(Duration::from_secs(u64::from(attempt))).await;
            }

            let token = self.credentials.bearer_token().await?;
            let mut req = self
                .client
                .request(method.clone(), &url)
                .bearer_auth(token);
            if let Some(ref b) = body {
                req = req.json(b);
            }

            let response = req.send().await.map_err(|e| HaggleError::Network {
                message: format!("chat API request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

            let status = response.status();
            debug!(status = %status, attempt, url = %url, "chat API response");

            if status.is_success() {
                return response.json::<T>().await.map_err(|e| HaggleError::Network {
                    message: format!("failed to parse chat API response: {e}"),
                    source: Some(Box::new(e)),
                });
            }

            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                return Err(HaggleError::AuthRequired);
            }

            let body_text = response.text().await.unwrap_or_default();

            if is_transient_status(status) && attempt < self.max_retries {
                warn!(status = %status, body = %body_text, "transient error, will retry");
                last_error = Some(HaggleError::Network {
                    message: format!("chat API returned {status}: {body_text}"),
                    source: None,
                });
                continue;
            }

            return Err(classify_error(status, &body_text));
        }

        Err(last_error.unwrap_or_else(|| HaggleError::Network {
            message: "chat API request failed after retries".into(),
            source: None,
        }))
    }
}

#[async_trait]
impl ChatApi for RestChatApi {
    async fn list_conversations(
        &self,
        filter: ConversationFilter,
    ) -> Result<ConversationPage, HaggleError> {
        let response: ChatListResponse = self
            .request(Method::GET, &format!("/chat/?type={filter}"), None)
            .await?;
        Ok(response.into())
    }

    async fn start_product_chat(
        &self,
        listing_kind: ListingKind,
        listing_id: i64,
    ) -> Result<StartedChat, HaggleError> {
        let body = StartProductChatRequest {
            listing_type: listing_kind,
            listing_id,
        };
        let response: StartChatResponse = self
            .request(
                Method::POST,
                "/chat/product/start/",
                Some(serde_json::to_value(&body).map_err(|e| {
                    HaggleError::Internal(format!("failed to serialize request: {e}"))
                })?),
            )
            .await?;
        Ok(response.into())
    }

    async fn start_direct_chat(&self, recipient: &UserId) -> Result<StartedChat, HaggleError> {
        let body = StartDirectChatRequest {
            recipient_id: recipient.0.clone(),
        };
        let response: StartChatResponse = self
            .request(
                Method::POST,
                "/chat/direct/start/",
                Some(serde_json::to_value(&body).map_err(|e| {
                    HaggleError::Internal(format!("failed to serialize request: {e}"))
                })?),
            )
            .await?;
        Ok(response.into())
    }

    async fn message_history(
        &self,
        conversation: &ConversationId,
        page: u32,
    ) -> Result<HistoryPage, HaggleError> {
        let response: MessageHistoryResponse = self
            .request(
                Method::GET,
                &format!("/chat/{}/messages/?page={page}", conversation.0),
                None,
            )
            .await?;
        Ok(response.into())
    }

    async fn send_message(
        &self,
        conversation: &ConversationId,
        content: &str,
    ) -> Result<Message, HaggleError> {
        let body = SendMessageRequest {
            content: content.to_string(),
        };
        let response: MessageDto = self
            .request(
                Method::POST,
                &format!("/chat/{}/send/", conversation.0),
                Some(serde_json::to_value(&body).map_err(|e| {
                    HaggleError::Internal(format!("failed to serialize request: {e}"))
                })?),
            )
            .await?;
        Ok(response.into_message(conversation.clone()))
    }

    async fn mark_read(&self, conversation: &ConversationId) -> Result<(), HaggleError> {
        let _ack: serde_json::Value = self
            .request(
                Method::POST,
                &format!("/chat/{}/read/", conversation.0),
                None,
            )
            .await?;
        Ok(())
    }

    async fn unread_count(&self) -> Result<u64, HaggleError> {
        let response: UnreadCountResponse =
            self.request(Method::GET, "/chat/unread/", None).await?;
        Ok(response.total_unread)
    }
}

/// Statuses worth retrying: rate limiting and transient server failures.
fn is_transient_status(status: StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 502 | 503)
}

/// Maps a non-transient error response into the error taxonomy.
fn classify_error(status: StatusCode, body: &str) -> HaggleError {
    if let Ok(api_err) = serde_json::from_str::<ApiErrorResponse>(body) {
        if api_err.error.code.as_deref() == Some("self_chat") {
            return HaggleError::SelfChat;
        }
        return HaggleError::Network {
            message: format!("chat API error ({status}): {}", api_err.error.message),
            source: None,
        };
    }
    HaggleError::Network {
        message: format!("chat API returned {status}: {body}"),
        source: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use haggle_core::traits::StaticToken;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_api(base_url: &str, max_retries: u32) -> RestChatApi {
        let config = RestConfig {
            base_url: base_url.to_string(),
            timeout_secs: 5,
            max_retries,
        };
        RestChatApi::new(&config, Arc::new(StaticToken("test-token".into()))).unwrap()
    }

    fn chat_list_body() -> serde_json::Value {
        serde_json::json!({
            "chats": [
                {
                    "chat_id": "7",
                    "chat_type": "product",
                    "other_user": {"id": "u-2", "display_name": "Sam"},
                    "listing": {
                        "id": 42,
                        "listing_type": "job",
                        "title": "Barista wanted",
                        "price": "$18/hr"
                    },
                    "last_message": {"content": "still open?", "created_at": "2026-03-01T10:00:00Z"},
                    "unread_count": 2
                },
                {
                    "chat_id": "9",
                    "chat_type": "direct",
                    "other_user": {"id": "u-3", "display_name": "Lee"},
                    "unread_count": 0
                }
            ],
            "total_count": 2,
            "product_chats": 1,
            "direct_chats": 1
        })
    }

    #[tokio::test]
    async fn list_conversations_maps_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/chat/"))
            .and(query_param("type", "all"))
            .and(header("authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_list_body()))
            .mount(&server)
            .await;

        let api = test_api(&server.uri(), 0);
        let page = api
            .list_conversations(ConversationFilter::All)
            .await
            .unwrap();
        assert_eq!(page.chats.len(), 2);
        assert_eq!(page.total_count, 2);
        assert_eq!(page.product_chats, 1);
        assert_eq!(page.chats[0].unread_count, 2);
    }

    #[tokio::test]
    async fn list_conversations_passes_filter() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/chat/"))
            .and(query_param("type", "direct"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "chats": [], "total_count": 0, "product_chats": 0, "direct_chats": 0
            })))
            .expect(1)
            .mount(&server)
            .await;

        let api = test_api(&server.uri(), 0);
        let page = api
            .list_conversations(ConversationFilter::Direct)
            .await
            .unwrap();
        assert!(page.chats.is_empty());
    }

    #[tokio::test]
    async fn start_product_chat_is_idempotent() {
        let server = MockServer::start().await;
        let recipient = serde_json::json!({"id": "u-2", "display_name": "Sam"});

        // First call creates the conversation, the second returns it.
        Mock::given(method("POST"))
            .and(path("/chat/product/start/"))
            .and(body_json(serde_json::json!({"listing_type": "job", "listing_id": 42})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "chat_id": "7", "created": true, "recipient": recipient
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/chat/product/start/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "chat_id": "7", "created": false, "recipient": recipient
            })))
            .mount(&server)
            .await;

        let api = test_api(&server.uri(), 0);
        let first = api.start_product_chat(ListingKind::Job, 42).await.unwrap();
        let second = api.start_product_chat(ListingKind::Job, 42).await.unwrap();

        assert_eq!(first.id, second.id);
        assert!(first.created);
        assert!(!second.created);
    }

    #[tokio::test]
    async fn self_chat_error_code_maps_to_self_chat() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/direct/start/"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": {"code": "self_chat", "message": "cannot chat with yourself"}
            })))
            .mount(&server)
            .await;

        let api = test_api(&server.uri(), 0);
        let result = api.start_direct_chat(&UserId("u-1".into())).await;
        assert!(matches!(result, Err(HaggleError::SelfChat)));
    }

    #[tokio::test]
    async fn unauthorized_maps_to_auth_required() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/chat/unread/"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let api = test_api(&server.uri(), 0);
        assert!(matches!(
            api.unread_count().await,
            Err(HaggleError::AuthRequired)
        ));
    }

    #[tokio::test]
    async fn retries_on_503_then_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/chat/unread/"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/chat/unread/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"total_unread": 4})),
            )
            .mount(&server)
            .await;

        let api = test_api(&server.uri(), 1);
        assert_eq!(api.unread_count().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn gives_up_after_exhausting_retries() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/chat/unread/"))
            .respond_with(ResponseTemplate::new(503))
            .expect(2)
            .mount(&server)
            .await;

        let api = test_api(&server.uri(), 1);
        let result = api.unread_count().await;
        assert!(matches!(result, Err(HaggleError::Network { .. })));
    }

    #[tokio::test]
    async fn history_passes_page_number() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/chat/7/messages/"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "chat_id": "7",
                "chat_type": "direct",
                "other_user": {"id": "u-2", "display_name": "Sam"},
                "messages": []
            })))
            .mount(&server)
            .await;

        let api = test_api(&server.uri(), 0);
        let page = api
            .message_history(&ConversationId("7".into()), 2)
            .await
            .unwrap();
        assert!(page.messages.is_empty());
        assert_eq!(page.peer.display_name, "Sam");
    }

    #[tokio::test]
    async fn send_message_fallback_binds_conversation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/7/send/"))
            .and(body_json(serde_json::json!({"content": "hello"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "m-9",
                "sender": {"id": "u-1", "display_name": "Me"},
                "content": "hello",
                "created_at": "2026-03-01T10:05:00Z",
                "is_read": false
            })))
            .mount(&server)
            .await;

        let api = test_api(&server.uri(), 0);
        let msg = api
            .send_message(&ConversationId("7".into()), "hello")
            .await
            .unwrap();
        assert_eq!(msg.conversation_id, ConversationId("7".into()));
        assert_eq!(msg.content, "hello");
    }

    #[tokio::test]
    async fn mark_read_posts_to_read_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/7/read/"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"success": true})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let api = test_api(&server.uri(), 0);
        assert!(api.mark_read(&ConversationId("7".into())).await.is_ok());
    }

    #[tokio::test]
    async fn connection_failure_maps_to_network_error() {
        // Nothing listens on this port; the dial fails fast.
        let api = test_api("http://127.0.0.1:9", 0);
        let result = api.unread_count().await;
        assert!(matches!(result, Err(HaggleError::Network { .. })));
    }
}
