use crate::config::MessengerConfig;
use crate::errors::{RelayError, RelayResult};
use crate::utils::http::{MAX_ERROR_BODY_BYTES, build_http_client, limited_text};
use crate::utils::truncate_for_log;
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Body of a Send API text message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendRequest {
    pub recipient: Recipient,
    pub message: TextMessage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextMessage {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
}

impl SendRequest {
    pub fn text(recipient_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            recipient: Recipient {
                id: recipient_id.into(),
            },
            message: TextMessage {
                text: text.into(),
                metadata: None,
            },
        }
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: impl Into<String>) -> Self {
        self.message.metadata = Some(metadata.into());
        self
    }
}

/// Transmits a reply to a user on the messaging platform.
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send(&self, recipient_id: &str, text: &str) -> RelayResult<()>;
}

/// Sender backed by the Graph API `me/messages` endpoint.
pub struct GraphApiSender {
    client: Client,
    messages_url: String,
    page_access_token: String,
}

impl GraphApiSender {
    pub fn new(config: &MessengerConfig) -> RelayResult<Self> {
        Ok(Self {
            client: build_http_client(config.timeout_secs)?,
            messages_url: config.messages_url(),
            page_access_token: config.page_access_token.clone(),
        })
    }

    /// Post a prepared message. The platform's answer is not validated beyond
    /// receipt; a non-success status is only logged.
    pub async fn deliver(&self, message: &SendRequest) -> RelayResult<()> {
        let body = serde_json::to_vec(message).map_err(RelayError::Encode)?;

        let resp = self
            .client
            .post(&self.messages_url)
            .query(&[("access_token", self.page_access_token.as_str())])
            .header(CONTENT_TYPE, "application/json; charset=UTF-8")
            .body(body)
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            debug!("send api accepted message for {}", message.recipient.id);
        } else {
            let detail = limited_text(resp, MAX_ERROR_BODY_BYTES)
                .await
                .unwrap_or_else(|e| format!("<unreadable body: {e}>"));
            warn!(
                "send api answered {} for {}: {}",
                status,
                message.recipient.id,
                truncate_for_log(&detail, 200)
            );
        }
        Ok(())
    }
}

#[async_trait]
impl MessageSender for GraphApiSender {
    async fn send(&self, recipient_id: &str, text: &str) -> RelayResult<()> {
        self.deliver(&SendRequest::text(recipient_id, text)).await
    }
}
