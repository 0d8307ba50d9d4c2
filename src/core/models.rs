use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One discovered unit of content. `id` is the dedup key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub title: String,
    pub source_name: String,
    pub published_at: DateTime<Utc>,
}

impl Item {
    #[must_use]
    pub fn canonical_url(&self) -> String {
        canonical_item_url(&self.id)
    }
}

#[must_use]
pub fn canonical_item_url(item_id: &str) -> String {
    format!("https://youtu.be/{item_id}")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

/// Join ordered segments into the flat text fed to the summarizer.
#[must_use]
pub fn flatten_segments(segments: &[TranscriptSegment]) -> String {
    segments
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedRecord {
    pub item_id: String,
    pub source_name: String,
    pub summary: String,
    pub processed_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkKind {
    Microblog,
    Longform,
}

impl fmt::Display for SinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkKind::Microblog => f.write_str("microblog"),
            SinkKind::Longform => f.write_str("longform"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SinkOutcome {
    Published { post_id: String },
    Skipped { reason: String },
    Failed { error: String },
}

impl SinkOutcome {
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, SinkOutcome::Failed { .. })
    }
}

pub type DistributionReport = BTreeMap<SinkKind, SinkOutcome>;

/// Terminal state reached by one discovered item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    DuplicateSkip,
    TranscriptMissingSkip,
    SummaryFailedSkip,
    Recorded { sinks: DistributionReport },
    /// Summary generated and distribution attempted, but the record write
    /// failed; the item will be processed again on the next run.
    RecordFailed { sinks: DistributionReport },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemReport {
    pub source_id: String,
    pub item_id: String,
    pub outcome: ItemOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub run_id: String,
    pub items: Vec<ItemReport>,
    pub skipped_sources: Vec<String>,
}

impl RunReport {
    #[must_use]
    pub fn count(&self, pred: impl Fn(&ItemOutcome) -> bool) -> usize {
        self.items.iter().filter(|r| pred(&r.outcome)).count()
    }

    #[must_use]
    pub fn recorded(&self) -> usize {
        self.count(|o| matches!(o, ItemOutcome::Recorded { .. }))
    }

    #[must_use]
    pub fn summary_line(&self) -> String {
        format!(
            "Processing completed successfully: {} recorded, {} duplicates, {} without transcript, {} summary failures, {} record failures, {} sources skipped",
            self.recorded(),
            self.count(|o| matches!(o, ItemOutcome::DuplicateSkip)),
            self.count(|o| matches!(o, ItemOutcome::TranscriptMissingSkip)),
            self.count(|o| matches!(o, ItemOutcome::SummaryFailedSkip)),
            self.count(|o| matches!(o, ItemOutcome::RecordFailed { .. })),
            self.skipped_sources.len(),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Ok,
    Error,
}

/// Result of one scheduled invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOutcome {
    pub status: RunStatus,
    pub message: String,
}

impl RunOutcome {
    #[must_use]
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            status: RunStatus::Ok,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: RunStatus::Error,
            message: message.into(),
        }
    }
}
