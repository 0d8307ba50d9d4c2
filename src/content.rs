//! Transcript retrieval with language selection and translation fallback.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::core::models::{TranscriptSegment, flatten_segments};
use crate::errors::DigestError;

/// One transcript track advertised for an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptTrack {
    pub language_code: String,
    pub name: Option<String>,
    pub is_generated: bool,
    pub is_translatable: bool,
    /// Signed caption URL when the listing supplied one.
    pub fetch_url: Option<String>,
}

#[derive(Debug, Error)]
pub enum TranscriptError {
    #[error("transcripts are disabled")]
    Disabled,

    #[error("no transcript found")]
    NotFound,

    #[error("translation failed: {0}")]
    Translation(String),

    #[error("transcript request failed: {0}")]
    Request(String),
}

#[async_trait]
pub trait TranscriptProvider: Send + Sync {
    async fn list_tracks(&self, item_id: &str) -> Result<Vec<TranscriptTrack>, TranscriptError>;

    /// Ordered segments of `track`, translated to `translate_to` when given.
    async fn fetch_segments(
        &self,
        item_id: &str,
        track: &TranscriptTrack,
        translate_to: Option<&str>,
    ) -> Result<Vec<TranscriptSegment>, TranscriptError>;
}

#[async_trait]
impl<P: TranscriptProvider + ?Sized> TranscriptProvider for Arc<P> {
    async fn list_tracks(&self, item_id: &str) -> Result<Vec<TranscriptTrack>, TranscriptError> {
        (**self).list_tracks(item_id).await
    }

    async fn fetch_segments(
        &self,
        item_id: &str,
        track: &TranscriptTrack,
        translate_to: Option<&str>,
    ) -> Result<Vec<TranscriptSegment>, TranscriptError> {
        (**self).fetch_segments(item_id, track, translate_to).await
    }
}

fn language_matches(track: &TranscriptTrack, language: &str) -> bool {
    let code = track.language_code.to_ascii_lowercase();
    let wanted = language.to_ascii_lowercase();
    code == wanted || code.starts_with(&format!("{wanted}-"))
}

/// Pick a track already in `language`, preferring manually created ones.
#[must_use]
pub fn select_track<'a>(tracks: &'a [TranscriptTrack], language: &str) -> Option<&'a TranscriptTrack> {
    let matching: Vec<&TranscriptTrack> = tracks
        .iter()
        .filter(|t| language_matches(t, language))
        .collect();
    matching
        .iter()
        .copied()
        .find(|t| !t.is_generated)
        .or_else(|| matching.first().copied())
}

/// Pick any track to translate, preferring manually created ones.
fn fallback_track(tracks: &[TranscriptTrack]) -> Option<&TranscriptTrack> {
    tracks
        .iter()
        .find(|t| !t.is_generated)
        .or_else(|| tracks.first())
}

pub struct ContentFetcher<P> {
    provider: P,
}

impl<P: TranscriptProvider> ContentFetcher<P> {
    #[must_use]
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Flat transcript text for `item_id` in `preferred_language`.
    ///
    /// # Errors
    ///
    /// Returns `ContentUnavailable` when transcripts are disabled, missing,
    /// untranslatable, or the provider fails.
    pub async fn fetch_transcript(
        &self,
        item_id: &str,
        preferred_language: &str,
    ) -> Result<String, DigestError> {
        self.try_fetch(item_id, preferred_language)
            .await
            .map_err(|e| {
                match e {
                    TranscriptError::Disabled | TranscriptError::NotFound => {
                        warn!("Transcript unavailable for item {}: {}", item_id, e);
                    }
                    TranscriptError::Translation(_) | TranscriptError::Request(_) => {
                        warn!("Error fetching transcript for item {}: {}", item_id, e);
                    }
                }
                DigestError::ContentUnavailable(format!("{item_id}: {e}"))
            })
    }

    async fn try_fetch(&self, item_id: &str, language: &str) -> Result<String, TranscriptError> {
        let tracks = self.provider.list_tracks(item_id).await?;

        let segments = if let Some(track) = select_track(&tracks, language) {
            self.provider.fetch_segments(item_id, track, None).await?
        } else {
            let track = fallback_track(&tracks).ok_or(TranscriptError::NotFound)?;
            if !track.is_translatable {
                return Err(TranscriptError::Translation(format!(
                    "track '{}' cannot be translated to '{}'",
                    track.language_code, language
                )));
            }
            info!(
                "Translating transcript for item {} from {} to {}",
                item_id, track.language_code, language
            );
            self.provider
                .fetch_segments(item_id, track, Some(language))
                .await
                .map_err(|e| match e {
                    TranscriptError::Translation(msg) => TranscriptError::Translation(msg),
                    other => TranscriptError::Translation(other.to_string()),
                })?
        };

        if segments.is_empty() {
            return Err(TranscriptError::NotFound);
        }
        Ok(flatten_segments(&segments))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(code: &str, generated: bool) -> TranscriptTrack {
        TranscriptTrack {
            language_code: code.to_string(),
            name: None,
            is_generated: generated,
            is_translatable: true,
            fetch_url: None,
        }
    }

    #[test]
    fn test_select_track_prefers_manual() {
        let tracks = vec![track("en", true), track("de", false), track("en", false)];
        let chosen = select_track(&tracks, "en").unwrap();
        assert!(!chosen.is_generated);
        assert_eq!(chosen.language_code, "en");
    }

    #[test]
    fn test_select_track_accepts_regional_variant() {
        let tracks = vec![track("en-GB", true)];
        assert_eq!(select_track(&tracks, "en").unwrap().language_code, "en-GB");
        assert!(select_track(&tracks, "e").is_none());
    }

    #[test]
    fn test_fallback_track_prefers_manual() {
        let tracks = vec![track("fr", true), track("de", false)];
        assert_eq!(fallback_track(&tracks).unwrap().language_code, "de");
        assert!(fallback_track(&[]).is_none());
    }
}
