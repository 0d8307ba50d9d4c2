//! Full-length and sink-constrained summaries.

use tracing::{info, warn};

use super::generator::{CompletionRequest, TextGenerator};
use crate::core::models::canonical_item_url;
use crate::core::settings::EffectiveSettings;
use crate::errors::DigestError;
use crate::prompt::{
    SINK_SEPARATOR_OVERHEAD, SINK_SYSTEM_PROMPT, SUMMARY_SYSTEM_PROMPT, build_sink_prompt,
    build_summary_prompt, char_len, compose_sink_payload, fit_to_length, sink_attribution,
    sink_available_length, truncate_prompt,
};

const SUMMARY_TEMPERATURE: f64 = 0.5;
const SUMMARY_MAX_TOKENS: i64 = 1000;
const SINK_TEMPERATURE: f64 = 0.7;
const SINK_MAX_TOKENS: i64 = 100;

/// Inputs to a full summary.
#[derive(Debug, Clone, Copy)]
pub struct SummaryRequest<'a> {
    pub transcript: &'a str,
    pub settings: EffectiveSettings,
    pub title: Option<&'a str>,
    pub source_name: Option<&'a str>,
    pub model: &'a str,
}

pub struct Summarizer {
    generator: Option<Box<dyn TextGenerator>>,
    sink_model: String,
}

impl Summarizer {
    /// `generator` is `None` when no credential is configured; every call then
    /// fails with `SummarizationFailed`.
    #[must_use]
    pub fn new(generator: Option<Box<dyn TextGenerator>>, sink_model: impl Into<String>) -> Self {
        Self {
            generator,
            sink_model: sink_model.into(),
        }
    }

    fn generator(&self) -> Result<&dyn TextGenerator, DigestError> {
        self.generator.as_deref().ok_or_else(|| {
            DigestError::SummarizationFailed("OpenAI API key not configured".to_string())
        })
    }

    /// # Errors
    ///
    /// Returns `SummarizationFailed` when no credential is configured, the
    /// transcript is empty, or the generation call fails.
    pub async fn summarize(&self, request: SummaryRequest<'_>) -> Result<String, DigestError> {
        let generator = self.generator()?;
        if request.transcript.trim().is_empty() {
            return Err(DigestError::SummarizationFailed(
                "No transcript provided for summarization".to_string(),
            ));
        }

        let prompt = build_summary_prompt(
            request.transcript,
            request.settings.style,
            request.settings.max_length_words,
            request.settings.include_timestamps,
            request.title,
            request.source_name,
        );
        let prompt_len = char_len(&prompt);
        let prompt = truncate_prompt(prompt);
        if char_len(&prompt) != prompt_len {
            warn!(
                "Transcript too long ({} chars), truncated prompt to {} chars",
                prompt_len,
                char_len(&prompt)
            );
        }

        let completion = CompletionRequest::new(request.model, SUMMARY_SYSTEM_PROMPT, prompt)
            .temperature(SUMMARY_TEMPERATURE)
            .max_tokens(SUMMARY_MAX_TOKENS);

        generator
            .complete(completion)
            .await
            .map_err(|e| DigestError::SummarizationFailed(e.to_string()))
    }

    /// Compact variant of `summary` that always fits `sink_char_budget`.
    ///
    /// # Errors
    ///
    /// Returns `SinkBudgetExhausted` when the URL and attribution leave 50 or
    /// fewer characters, and `SummarizationFailed` when generation fails.
    pub async fn summarize_for_sink(
        &self,
        summary: &str,
        title: &str,
        item_id: &str,
        source_name: &str,
        sink_char_budget: usize,
    ) -> Result<String, DigestError> {
        let url = canonical_item_url(item_id);
        let attribution = sink_attribution(source_name);
        let Some(available) = sink_available_length(sink_char_budget, &url, &attribution) else {
            let available = sink_char_budget.saturating_sub(
                char_len(&url) + char_len(&attribution) + SINK_SEPARATOR_OVERHEAD,
            );
            warn!("Not enough space for a meaningful sink summary ({} chars)", available);
            return Err(DigestError::SinkBudgetExhausted { available });
        };

        let generator = self.generator()?;
        let prompt = build_sink_prompt(summary, title, source_name, available);
        let completion =
            CompletionRequest::new(self.sink_model.as_str(), SINK_SYSTEM_PROMPT, prompt)
                .temperature(SINK_TEMPERATURE)
                .max_tokens(SINK_MAX_TOKENS);

        let body = generator
            .complete(completion)
            .await
            .map_err(|e| DigestError::SummarizationFailed(e.to_string()))?;

        let body = fit_to_length(body.trim(), available);
        info!(
            "Built sink message for item {} ({} of {} body chars)",
            item_id,
            char_len(&body),
            available
        );
        Ok(compose_sink_payload(&body, &url, &attribution))
    }
}
