//! Concrete sinks.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use super::deliver::Sink;
use crate::ai::Summarizer;
use crate::clients::XClient;
use crate::core::models::{Item, SinkKind, SinkOutcome};
use crate::errors::DigestError;
use crate::prompt::DEFAULT_SINK_CHAR_BUDGET;

/// Posts a budget-constrained rephrasing of the summary to X.
pub struct MicroblogSink {
    summarizer: Arc<Summarizer>,
    client: Option<XClient>,
    char_budget: usize,
}

impl MicroblogSink {
    #[must_use]
    pub fn new(summarizer: Arc<Summarizer>, client: Option<XClient>) -> Self {
        Self {
            summarizer,
            client,
            char_budget: DEFAULT_SINK_CHAR_BUDGET,
        }
    }

    #[must_use]
    pub fn with_char_budget(mut self, char_budget: usize) -> Self {
        self.char_budget = char_budget;
        self
    }
}

#[async_trait]
impl Sink for MicroblogSink {
    fn kind(&self) -> SinkKind {
        SinkKind::Microblog
    }

    async fn publish(&self, summary: &str, item: &Item) -> Result<SinkOutcome, DigestError> {
        let Some(client) = &self.client else {
            return Err(DigestError::DistributionFailed(
                "X OAuth 1.0a credentials not configured".to_string(),
            ));
        };

        let text = self
            .summarizer
            .summarize_for_sink(summary, &item.title, &item.id, &item.source_name, self.char_budget)
            .await?;
        let post_id = client.create_post(&text).await?;
        Ok(SinkOutcome::Published { post_id })
    }
}

/// Long-form publishing is not implemented; enabling it only logs.
pub struct LongformSink;

#[async_trait]
impl Sink for LongformSink {
    fn kind(&self) -> SinkKind {
        SinkKind::Longform
    }

    async fn publish(&self, _summary: &str, item: &Item) -> Result<SinkOutcome, DigestError> {
        info!("Would post to long-form sink for item {}", item.id);
        Ok(SinkOutcome::Skipped {
            reason: "long-form publishing not implemented".to_string(),
        })
    }
}
