//! `OpenAI` chat-completions client backing the summarizer.

use async_trait::async_trait;
use openai_api_rs::v1::chat_completion::{ChatCompletionMessage, Content, MessageRole};
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::{Value, json};
use std::time::Duration;
use tracing::info;

use crate::ai::{CompletionRequest, TextGenerator};
use crate::core::config::AppConfig;
use crate::errors::DigestError;

const OPENAI_TIMEOUT_SECS: u64 = 120;

/// Convert prompt messages into the chat-completions wire shape.
pub(crate) fn build_chat_messages(prompt: &[ChatCompletionMessage]) -> Vec<Value> {
    prompt
        .iter()
        .filter_map(|m| {
            let role_str = match m.role {
                MessageRole::system => "system",
                MessageRole::user | MessageRole::function | MessageRole::tool => "user",
                MessageRole::assistant => "assistant",
            };
            match &m.content {
                Content::Text(t) => Some(json!({
                    "role": role_str,
                    "content": t
                })),
                Content::ImageUrl(_) => None,
            }
        })
        .collect()
}

/// Extract the first choice's text from a chat-completions response.
pub(crate) fn extract_completion_text(response: &Value) -> Option<String> {
    response
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(|content| content.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

pub struct OpenAiGenerator {
    http: Client,
    api_key: String,
    org_id: Option<String>,
    base_url: String,
}

impl OpenAiGenerator {
    #[must_use]
    pub fn new(api_key: String, org_id: Option<String>, base_url: impl Into<String>) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(OPENAI_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            http,
            api_key,
            org_id,
            base_url: base_url.into(),
        }
    }

    /// `None` when no API key is configured.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Option<Self> {
        config.openai_api_key.as_ref().map(|key| {
            Self::new(
                key.clone(),
                config.openai_org_id.clone(),
                config.openai_api_base.clone(),
            )
        })
    }

    fn headers(&self) -> Result<HeaderMap, DigestError> {
        let mut headers = HeaderMap::new();
        let auth_value = HeaderValue::from_str(&format!("Bearer {}", self.api_key))
            .map_err(|e| DigestError::HttpError(format!("Invalid Authorization header: {e}")))?;
        headers.insert(AUTHORIZATION, auth_value);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(org) = &self.org_id {
            let org_value = HeaderValue::from_str(org).map_err(|e| {
                DigestError::HttpError(format!("Invalid OpenAI-Organization header: {e}"))
            })?;
            headers.insert("OpenAI-Organization", org_value);
        }
        Ok(headers)
    }
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    async fn complete(&self, request: CompletionRequest) -> Result<String, DigestError> {
        #[cfg(feature = "debug-logs")]
        info!("Using OpenAI prompt:\n{:?}", request.messages);

        #[cfg(not(feature = "debug-logs"))]
        info!(
            "Requesting completion from {} with {} messages",
            request.model,
            request.messages.len()
        );

        let body = json!({
            "model": request.model,
            "messages": build_chat_messages(&request.messages),
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
        });

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url.trim_end_matches('/')))
            .headers(self.headers()?)
            .json(&body)
            .send()
            .await
            .map_err(|e| DigestError::HttpError(format!("OpenAI API request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|e| {
                format!("Failed to read error response body (status {status}): {e}")
            });
            return Err(DigestError::OpenAIError(format!(
                "status {status}: {error_text}"
            )));
        }

        let response_json: Value = response.json().await.map_err(|e| {
            DigestError::OpenAIError(format!("Failed to parse OpenAI response: {e}"))
        })?;

        extract_completion_text(&response_json)
            .ok_or_else(|| DigestError::OpenAIError("No text in response".to_string()))
    }
}
