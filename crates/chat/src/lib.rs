//! BuildHerald chat infrastructure adapter.
//!
//! Implements the [`relay::ChatSink`] port over an incoming-webhook URL: the
//! message is posted as JSON and the endpoint's HTTP status is classified by
//! the domain's dispatch rule ([`relay::ChatDelivery::from_status`]).
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** HTTP transport, request formatting, and response
//! handling live here. The status-code dispatch rule does not: that is
//! domain policy, defined next to the [`relay::ChatDelivery`] type this
//! adapter returns.

use async_trait::async_trait;
use relay::errors::DeliveryError;
use relay::identifiers::WebhookUrl;
use relay::ports::{ChatDelivery, ChatMessage, ChatSink};

/// Posts chat messages to a resolved incoming-webhook URL.
#[derive(Debug, Clone)]
pub struct WebhookChatSink {
    http: reqwest::Client,
    url: WebhookUrl,
}

impl WebhookChatSink {
    /// Creates a sink posting to `url`.
    pub fn new(url: WebhookUrl) -> Self {
        Self {
            http: reqwest::Client::new(),
            url,
        }
    }
}

#[async_trait]
impl ChatSink for WebhookChatSink {
    async fn post(&self, message: &ChatMessage) -> Result<ChatDelivery, DeliveryError> {
        tracing::debug!(channel = ?message.channel, "posting chat message");
        let response = self
            .http
            .post(self.url.as_str())
            .json(message)
            .send()
            .await
            .map_err(|error| DeliveryError::Api {
                sink: "chat".to_string(),
                message: error.to_string(),
            })?;
        ChatDelivery::from_status(response.status().as_u16())
    }
}
