//! Best-effort fan-out of a summary to the sinks a source enables.

use async_trait::async_trait;
use tracing::{error, info};

use crate::core::models::{DistributionReport, Item, SinkKind, SinkOutcome};
use crate::core::settings::SourceConfig;
use crate::errors::DigestError;

#[async_trait]
pub trait Sink: Send + Sync {
    fn kind(&self) -> SinkKind;

    /// Publish a derivative of `summary` for `item`.
    async fn publish(&self, summary: &str, item: &Item) -> Result<SinkOutcome, DigestError>;
}

#[must_use]
pub fn sink_enabled(source: &SourceConfig, kind: SinkKind) -> bool {
    match kind {
        SinkKind::Microblog => source.post_to_microblog,
        SinkKind::Longform => source.post_to_longform,
    }
}

pub struct Distributor {
    sinks: Vec<Box<dyn Sink>>,
}

impl Distributor {
    #[must_use]
    pub fn new(sinks: Vec<Box<dyn Sink>>) -> Self {
        Self { sinks }
    }

    /// Attempt every sink enabled on `source`. A failing sink is logged and
    /// reported; it never stops the others.
    pub async fn distribute(
        &self,
        summary: &str,
        item: &Item,
        source: &SourceConfig,
    ) -> DistributionReport {
        let mut report = DistributionReport::new();

        for sink in self.sinks.iter().filter(|s| sink_enabled(source, s.kind())) {
            let kind = sink.kind();
            let outcome = match sink.publish(summary, item).await {
                Ok(outcome) => {
                    info!("Sink {} handled item {}: {:?}", kind, item.id, outcome);
                    outcome
                }
                Err(e) => {
                    error!("Failed to publish item {} to {}: {}", item.id, kind, e);
                    SinkOutcome::Failed {
                        error: e.to_string(),
                    }
                }
            };
            report.insert(kind, outcome);
        }

        report
    }
}
