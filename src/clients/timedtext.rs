//! Client for the YouTube timed-text endpoint.
//!
//! The endpoint answers with XML: a `transcript_list` of `track` elements for
//! `type=list`, and a `transcript` of `text` elements for a single track.
//! When the list comes back empty, the `captionTracks` array embedded in the
//! watch page's player response is used instead.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use super::http::{build_client, with_retry};
use crate::content::{TranscriptError, TranscriptProvider, TranscriptTrack};
use crate::core::config::AppConfig;
use crate::core::models::TranscriptSegment;
use crate::errors::DigestError;

#[derive(Debug, Deserialize)]
struct TrackListXml {
    #[serde(rename = "track", default)]
    tracks: Vec<TrackXml>,
}

#[derive(Debug, Deserialize)]
struct TrackXml {
    #[serde(rename = "@lang_code")]
    lang_code: String,
    #[serde(rename = "@name", default)]
    name: Option<String>,
    #[serde(rename = "@kind", default)]
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionTrackJson {
    base_url: String,
    language_code: String,
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    name: Option<CaptionNameJson>,
    #[serde(default)]
    is_translatable: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionNameJson {
    #[serde(default)]
    simple_text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TranscriptXml {
    #[serde(rename = "text", default)]
    lines: Vec<LineXml>,
}

#[derive(Debug, Deserialize)]
struct LineXml {
    #[serde(rename = "@start", default)]
    start: f64,
    #[serde(rename = "@dur", default)]
    dur: f64,
    #[serde(rename = "$text", default)]
    text: String,
}

/// Decode entities left in caption text and collapse inner whitespace.
fn clean_line(raw: &str) -> String {
    html_escape::decode_html_entities(raw)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub(crate) fn parse_track_list(xml: &str) -> Result<Vec<TranscriptTrack>, TranscriptError> {
    if xml.trim().is_empty() {
        return Ok(Vec::new());
    }
    let list: TrackListXml = quick_xml::de::from_str(xml)
        .map_err(|e| TranscriptError::Request(format!("parsing track list: {e}")))?;

    Ok(list
        .tracks
        .into_iter()
        .map(|t| TranscriptTrack {
            language_code: t.lang_code,
            name: t.name.filter(|n| !n.is_empty()),
            is_generated: t.kind.as_deref() == Some("asr"),
            is_translatable: true,
            fetch_url: None,
        })
        .collect())
}

const CAPTION_TRACKS_KEY: &str = "\"captionTracks\":";

/// Tracks from the `captionTracks` array of a watch page. A page without the
/// array has no captions.
pub(crate) fn parse_caption_tracks(html: &str) -> Result<Vec<TranscriptTrack>, TranscriptError> {
    let Some(start) = html.find(CAPTION_TRACKS_KEY) else {
        return Ok(Vec::new());
    };
    let rest = &html[start + CAPTION_TRACKS_KEY.len()..];

    // The array is followed by the rest of the player response.
    let tracks = serde_json::Deserializer::from_str(rest)
        .into_iter::<Vec<CaptionTrackJson>>()
        .next()
        .ok_or_else(|| TranscriptError::Request("captionTracks has no value".to_string()))?
        .map_err(|e| TranscriptError::Request(format!("parsing captionTracks: {e}")))?;

    Ok(tracks
        .into_iter()
        .map(|t| TranscriptTrack {
            language_code: t.language_code,
            name: t
                .name
                .and_then(|n| n.simple_text)
                .filter(|n| !n.is_empty()),
            is_generated: t.kind.as_deref() == Some("asr"),
            is_translatable: t.is_translatable,
            fetch_url: Some(t.base_url.replace("&fmt=srv3", "")),
        })
        .collect())
}

pub(crate) fn parse_transcript(xml: &str) -> Result<Vec<TranscriptSegment>, TranscriptError> {
    let transcript: TranscriptXml = quick_xml::de::from_str(xml)
        .map_err(|e| TranscriptError::Request(format!("parsing transcript: {e}")))?;

    Ok(transcript
        .lines
        .into_iter()
        .map(|line| TranscriptSegment {
            text: clean_line(&line.text),
            start: line.start,
            duration: line.dur,
        })
        .filter(|segment| !segment.text.is_empty())
        .collect())
}

pub struct TimedTextClient {
    http: Client,
    base_url: String,
    watch_url: Option<String>,
    max_retries: usize,
}

impl TimedTextClient {
    #[must_use]
    pub fn new(base_url: impl Into<String>, max_retries: usize) -> Self {
        Self {
            http: build_client(),
            base_url: base_url.into(),
            watch_url: None,
            max_retries,
        }
    }

    /// Fall back to the watch page at `watch_url` when the list is empty.
    #[must_use]
    pub fn with_watch_page(mut self, watch_url: impl Into<String>) -> Self {
        self.watch_url = Some(watch_url.into());
        self
    }

    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.timedtext_base.clone(), config.http_retries)
            .with_watch_page(config.youtube_watch_base.clone())
    }

    async fn get_text(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<(StatusCode, String), DigestError> {
        let response = self.http.get(url).query(query).send().await?;
        let status = response.status();
        if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            return Err(DigestError::HttpError(format!("timedtext: status={status}")));
        }
        let body = response.text().await?;
        Ok((status, body))
    }

    async fn get_with_retry(
        &self,
        url: &str,
        query: Vec<(&str, String)>,
    ) -> Result<(StatusCode, String), TranscriptError> {
        with_retry(self.max_retries, || self.get_text(url, &query))
            .await
            .map_err(|e| TranscriptError::Request(e.to_string()))
    }

    async fn list_from_watch_page(
        &self,
        watch_url: &str,
        item_id: &str,
    ) -> Result<Vec<TranscriptTrack>, TranscriptError> {
        let (status, body) = self
            .get_with_retry(watch_url, vec![("v", item_id.to_string())])
            .await?;
        if !status.is_success() {
            return Err(TranscriptError::Request(format!("watch page: status={status}")));
        }

        let tracks = parse_caption_tracks(&body)?;
        debug!(
            "Watch page listed {} caption tracks for item {}",
            tracks.len(),
            item_id
        );
        Ok(tracks)
    }
}

#[async_trait]
impl TranscriptProvider for TimedTextClient {
    async fn list_tracks(&self, item_id: &str) -> Result<Vec<TranscriptTrack>, TranscriptError> {
        let (status, body) = self
            .get_with_retry(
                &self.base_url,
                vec![("type", "list".to_string()), ("v", item_id.to_string())],
            )
            .await?;

        let mut tracks = match status {
            StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => return Err(TranscriptError::Disabled),
            s if s.is_success() => parse_track_list(&body)?,
            s => return Err(TranscriptError::Request(format!("track list: status={s}"))),
        };

        if tracks.is_empty() {
            if let Some(watch_url) = &self.watch_url {
                tracks = self.list_from_watch_page(watch_url, item_id).await?;
            }
        }

        if tracks.is_empty() {
            Err(TranscriptError::NotFound)
        } else {
            Ok(tracks)
        }
    }

    async fn fetch_segments(
        &self,
        item_id: &str,
        track: &TranscriptTrack,
        translate_to: Option<&str>,
    ) -> Result<Vec<TranscriptSegment>, TranscriptError> {
        let (url, mut query) = match &track.fetch_url {
            Some(url) => (url.as_str(), Vec::new()),
            None => {
                let mut query = vec![
                    ("v", item_id.to_string()),
                    ("lang", track.language_code.clone()),
                ];
                if let Some(name) = &track.name {
                    query.push(("name", name.clone()));
                }
                if track.is_generated {
                    query.push(("kind", "asr".to_string()));
                }
                (self.base_url.as_str(), query)
            }
        };
        if let Some(target) = translate_to {
            query.push(("tlang", target.to_string()));
        }

        let (status, body) = self.get_with_retry(url, query).await?;
        if !status.is_success() || body.trim().is_empty() {
            let detail = format!("track {} returned status={status}", track.language_code);
            return Err(match translate_to {
                Some(_) => TranscriptError::Translation(detail),
                None => TranscriptError::NotFound,
            });
        }

        parse_transcript(&body)
    }
}
