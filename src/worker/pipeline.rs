//! One batch run: discover, dedup, fetch, summarize, distribute, record.

use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

use super::deliver::Distributor;
use crate::ai::{SummaryRequest, Summarizer};
use crate::content::{ContentFetcher, TranscriptProvider};
use crate::core::models::{Item, ItemOutcome, ItemReport, RunOutcome, RunReport};
use crate::core::resolver::ConfigResolver;
use crate::core::settings::{GlobalSettings, SourceConfig};
use crate::discovery::{ItemDiscovery, lookback_start};
use crate::errors::DigestError;
use crate::store::{ProcessedTracker, RecordTable};

pub struct Pipeline {
    resolver: ConfigResolver,
    tracker: ProcessedTracker<Arc<dyn RecordTable>>,
    discovery: Box<dyn ItemDiscovery>,
    content: ContentFetcher<Arc<dyn TranscriptProvider>>,
    summarizer: Arc<Summarizer>,
    distributor: Distributor,
    transcript_language: String,
}

impl Pipeline {
    #[must_use]
    pub fn new(
        resolver: ConfigResolver,
        tracker: ProcessedTracker<Arc<dyn RecordTable>>,
        discovery: Box<dyn ItemDiscovery>,
        provider: Arc<dyn TranscriptProvider>,
        summarizer: Arc<Summarizer>,
        distributor: Distributor,
        transcript_language: impl Into<String>,
    ) -> Self {
        Self {
            resolver,
            tracker,
            discovery,
            content: ContentFetcher::new(provider),
            summarizer,
            distributor,
            transcript_language: transcript_language.into(),
        }
    }

    /// Process every configured source once.
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` when the lookback window cannot be computed.
    /// Every per-source and per-item failure is reported in the `RunReport`
    /// instead.
    pub async fn run(&self) -> Result<RunReport, DigestError> {
        let run_id = Uuid::new_v4().to_string();
        let span = info_span!("digest_run", run_id = %run_id);
        self.run_inner(run_id).instrument(span).await
    }

    /// `run` collapsed into the status/message pair returned to the scheduler.
    pub async fn run_once(&self) -> RunOutcome {
        match self.run().await {
            Ok(report) => {
                let line = report.summary_line();
                info!("{}", line);
                RunOutcome::ok(line)
            }
            Err(e) => {
                error!("Run failed: {}", e);
                RunOutcome::error(e.to_string())
            }
        }
    }

    async fn run_inner(&self, run_id: String) -> Result<RunReport, DigestError> {
        info!("Starting digest run");

        let config = self.resolver.resolve().await;
        let mut processed = self.tracker.get_processed_ids().await;
        let published_after = lookback_start(Utc::now(), config.global.days_to_look_back)?;

        let mut report = RunReport {
            run_id,
            ..RunReport::default()
        };

        for source in &config.sources {
            info!("Processing source: {} ({})", source.name, source.identifier);

            let items = match self
                .discovery
                .discover(
                    &source.identifier,
                    config.global.max_items_per_source,
                    Some(published_after),
                )
                .await
            {
                Ok(items) => items,
                Err(e) => {
                    warn!("Skipping source {}: {}", source.identifier, e);
                    report.skipped_sources.push(source.identifier.clone());
                    continue;
                }
            };
            info!("Found {} recent items for {}", items.len(), source.name);

            for item in &items {
                let outcome = self
                    .process_item(item, source, &config.global, &mut processed)
                    .await;
                report.items.push(ItemReport {
                    source_id: source.identifier.clone(),
                    item_id: item.id.clone(),
                    outcome,
                });
            }
        }

        Ok(report)
    }

    async fn process_item(
        &self,
        item: &Item,
        source: &SourceConfig,
        global: &GlobalSettings,
        processed: &mut HashSet<String>,
    ) -> ItemOutcome {
        if processed.contains(&item.id) {
            info!("Item {} already processed, skipping", item.id);
            return ItemOutcome::DuplicateSkip;
        }

        info!("Processing item: {} ({})", item.title, item.id);

        let transcript = match self
            .content
            .fetch_transcript(&item.id, &self.transcript_language)
            .await
        {
            Ok(transcript) => transcript,
            Err(_) => return ItemOutcome::TranscriptMissingSkip,
        };

        let request = SummaryRequest {
            transcript: &transcript,
            settings: source.effective(global),
            title: Some(&item.title),
            source_name: Some(&item.source_name),
            model: &global.generation_model,
        };
        let summary = match self.summarizer.summarize(request).await {
            Ok(summary) => summary,
            Err(e) => {
                error!("Failed to summarize item {}: {}", item.id, e);
                return ItemOutcome::SummaryFailedSkip;
            }
        };

        let sinks = self.distributor.distribute(&summary, item, source).await;

        match self
            .tracker
            .mark_processed(&item.id, &item.source_name, &summary)
            .await
        {
            Ok(()) => {
                processed.insert(item.id.clone());
                ItemOutcome::Recorded { sinks }
            }
            Err(e) => {
                error!("Item {} summarized but not recorded: {}", item.id, e);
                ItemOutcome::RecordFailed { sinks }
            }
        }
    }
}
