//! Messenger Send API client.

use async_trait::async_trait;
use reqwest::Client;
use tracing::info;

use super::types::{GraphErrorEnvelope, SendMessageRequest};
use crate::error::{read_error_body, RelayError};
use crate::Config;

/// Delivers a reply back to a Messenger user.
#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Send `text` to `recipient_id`. Attempted exactly once.
    async fn send_text(&self, recipient_id: &str, text: &str) -> Result<(), RelayError>;
}

/// Send API client authenticated with the page access token.
#[derive(Clone)]
pub struct GraphClient {
    client: Client,
    base_url: String,
    access_token: Option<String>,
}

impl GraphClient {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            base_url: config.graph_api_base.clone(),
            access_token: config.page_access_token.clone(),
        }
    }

    /// URL of the Send API endpoint, without the access token.
    pub fn messages_url(&self) -> String {
        format!("{}/me/messages", self.base_url)
    }
}

#[async_trait]
impl MessageSender for GraphClient {
    async fn send_text(&self, recipient_id: &str, text: &str) -> Result<(), RelayError> {
        let access_token = self
            .access_token
            .as_deref()
            .ok_or(RelayError::MissingSecret("PAGE_ACCESS_TOKEN"))?;

        let body = SendMessageRequest::text(recipient_id, text);

        let response = self
            .client
            .post(self.messages_url())
            .query(&[("access_token", access_token)])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            info!(
                recipient_id = %recipient_id,
                status_code = status.as_u16(),
                text_length = text.len(),
                "messenger_send_complete"
            );
            return Ok(());
        }

        let raw = read_error_body(response).await;
        Err(error_from_body(status, raw))
    }
}

/// Prefer the Graph API's structured error over the raw response body.
fn error_from_body(status: reqwest::StatusCode, raw: String) -> RelayError {
    match serde_json::from_str::<GraphErrorEnvelope>(&raw) {
        Ok(envelope) => RelayError::Graph {
            status,
            error: envelope.error,
        },
        Err(_) => RelayError::UnexpectedStatus { status, body: raw },
    }
}
