use async_trait::async_trait;
use openai_api_rs::v1::chat_completion::{ChatCompletionMessage, Content, MessageRole};

use crate::errors::DigestError;

/// One chat-completion call.
#[derive(Debug)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatCompletionMessage>,
    pub temperature: f64,
    pub max_tokens: i64,
}

impl CompletionRequest {
    #[must_use]
    pub fn new(model: impl Into<String>, system: &str, user: String) -> Self {
        Self {
            model: model.into(),
            messages: vec![
                text_message(MessageRole::system, system.to_string()),
                text_message(MessageRole::user, user),
            ],
            temperature: 1.0,
            max_tokens: 1000,
        }
    }

    #[must_use]
    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    #[must_use]
    pub fn max_tokens(mut self, max_tokens: i64) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Text of the last user message, if any.
    #[must_use]
    pub fn user_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .filter(|m| matches!(m.role, MessageRole::user))
            .find_map(|m| match &m.content {
                Content::Text(text) => Some(text.as_str()),
                Content::ImageUrl(_) => None,
            })
    }
}

#[must_use]
pub fn text_message(role: MessageRole, text: String) -> ChatCompletionMessage {
    ChatCompletionMessage {
        role,
        content: Content::Text(text),
        name: None,
        tool_calls: None,
        tool_call_id: None,
    }
}

/// The generative text service behind the summarizer.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<String, DigestError>;
}
