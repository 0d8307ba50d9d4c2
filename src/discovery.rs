//! Discovery of recently published items for a source.

use async_trait::async_trait;
use chrono::{DateTime, Duration, SecondsFormat, Utc};

use crate::core::models::Item;
use crate::errors::DigestError;

#[async_trait]
pub trait ItemDiscovery: Send + Sync {
    /// Items of type video published after `published_after`, newest first.
    ///
    /// An empty successful result is `Ok(vec![])`; any client or API failure
    /// is `SourceUnavailable`.
    async fn discover(
        &self,
        source_id: &str,
        max_results: u32,
        published_after: Option<DateTime<Utc>>,
    ) -> Result<Vec<Item>, DigestError>;
}

/// Lower bound of the discovery window.
///
/// # Errors
///
/// Returns `ConfigInvalid` when the lookback cannot be represented.
pub fn lookback_start(now: DateTime<Utc>, days_to_look_back: i64) -> Result<DateTime<Utc>, DigestError> {
    Duration::try_days(days_to_look_back)
        .and_then(|window| now.checked_sub_signed(window))
        .ok_or_else(|| {
            DigestError::ConfigInvalid(format!(
                "days_to_look_back out of range: {days_to_look_back}"
            ))
        })
}

/// ISO-8601 instant with a `Z` suffix, the form the search API expects.
#[must_use]
pub fn format_published_after(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}
