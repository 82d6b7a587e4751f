//! Gemini text generation client.

use async_trait::async_trait;
use reqwest::Client;
use tracing::info;

use super::types::{GenerateContentRequest, GenerateContentResponse, GoogleErrorEnvelope};
use crate::error::{read_error_body, RelayError};
use crate::Config;

/// Header carrying the API key, so the key never appears in a request URL.
pub const API_KEY_HEADER: &str = "x-goog-api-key";

/// Produces a reply for a user message.
#[async_trait]
pub trait ReplyGenerator: Send + Sync {
    /// Generate a reply to `prompt`. Attempted exactly once, never streamed.
    async fn generate(&self, prompt: &str) -> Result<String, RelayError>;
}

/// Client for the Gemini `generateContent` REST endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiClient {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            base_url: config.gemini_api_base.clone(),
            model: normalize_model(&config.gemini_model),
            api_key: config.gemini_api_key.clone(),
        }
    }

    /// Model identifier without the `models/` resource prefix.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// URL of the generation endpoint, without the API key.
    pub fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

#[async_trait]
impl ReplyGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, RelayError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(RelayError::MissingSecret("GEMINI_API_KEY"))?;

        let response = self
            .client
            .post(self.endpoint())
            .header(API_KEY_HEADER, api_key)
            .json(&GenerateContentRequest::user_prompt(prompt))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let raw = read_error_body(response).await;
            let body = match serde_json::from_str::<GoogleErrorEnvelope>(&raw) {
                Ok(envelope) => match envelope.error.status {
                    Some(code) => format!("{}: {}", code, envelope.error.message),
                    None => envelope.error.message,
                },
                Err(_) => raw,
            };
            return Err(RelayError::UnexpectedStatus { status, body });
        }

        let parsed: GenerateContentResponse = response.json().await?;
        let text = parsed.into_text()?;

        info!(
            model = %self.model,
            prompt_length = prompt.len(),
            reply_length = text.len(),
            "gemini_generate_complete"
        );

        Ok(text)
    }
}

/// Accept both `gemini-pro` and `models/gemini-pro`.
fn normalize_model(model: &str) -> String {
    model.trim().trim_start_matches("models/").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_model() {
        assert_eq!(normalize_model("gemini-pro"), "gemini-pro");
        assert_eq!(normalize_model("models/gemini-pro"), "gemini-pro");
        assert_eq!(normalize_model(" models/gemini-1.5-flash "), "gemini-1.5-flash");
    }

    #[test]
    fn test_endpoint() {
        let gemini = GeminiClient::new(Client::new(), &Config::default());
        assert_eq!(
            gemini.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-pro:generateContent"
        );
    }

    #[tokio::test]
    async fn test_generate_without_key_fails_fast() {
        let gemini = GeminiClient::new(Client::new(), &Config::default());

        let result = gemini.generate("hi").await;

        assert!(matches!(
            result,
            Err(RelayError::MissingSecret("GEMINI_API_KEY"))
        ));
    }
}
