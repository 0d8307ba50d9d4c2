use thiserror::Error;

#[derive(Debug, Error)]
pub enum DigestError {
    #[error("Configuration is invalid: {0}")]
    ConfigInvalid(String),

    #[error("Source is unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Content is unavailable: {0}")]
    ContentUnavailable(String),

    #[error("Failed to generate summary: {0}")]
    SummarizationFailed(String),

    #[error("Not enough room for a sink message: {available} characters available")]
    SinkBudgetExhausted { available: usize },

    #[error("Failed to publish to sink: {0}")]
    DistributionFailed(String),

    #[error("Failed to persist processed record: {0}")]
    PersistenceFailed(String),

    #[error("Failed to access OpenAI API: {0}")]
    OpenAIError(String),

    #[error("Failed to send HTTP request: {0}")]
    HttpError(String),

    #[error("Failed to interact with AWS services: {0}")]
    AwsError(String),
}

impl DigestError {
    /// Whether a retry has a reasonable chance of succeeding.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, DigestError::HttpError(_))
    }
}

impl From<reqwest::Error> for DigestError {
    fn from(error: reqwest::Error) -> Self {
        DigestError::HttpError(error.to_string())
    }
}

impl From<serde_json::Error> for DigestError {
    fn from(error: serde_json::Error) -> Self {
        DigestError::ConfigInvalid(error.to_string())
    }
}
