//! YouTube Data API v3 client used for item discovery.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, warn};

use super::http::{build_client, error_for_status, with_retry};
use crate::core::config::AppConfig;
use crate::core::models::Item;
use crate::discovery::{ItemDiscovery, format_published_after};
use crate::errors::DigestError;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    id: ResultId,
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResultId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    title: String,
    channel_title: String,
    published_at: DateTime<Utc>,
}

pub struct YouTubeClient {
    http: Client,
    api_key: Option<String>,
    base_url: String,
    max_retries: usize,
}

impl YouTubeClient {
    #[must_use]
    pub fn new(api_key: Option<String>, base_url: impl Into<String>, max_retries: usize) -> Self {
        Self {
            http: build_client(),
            api_key,
            base_url: base_url.into(),
            max_retries,
        }
    }

    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.youtube_api_key.clone(),
            config.youtube_api_base.clone(),
            config.http_retries,
        )
    }

    async fn search(
        &self,
        api_key: &str,
        source_id: &str,
        max_results: u32,
        published_after: Option<&str>,
    ) -> Result<SearchResponse, DigestError> {
        let mut query: Vec<(&str, String)> = vec![
            ("part", "snippet".to_string()),
            ("channelId", source_id.to_string()),
            ("maxResults", max_results.to_string()),
            ("order", "date".to_string()),
            ("type", "video".to_string()),
            ("key", api_key.to_string()),
        ];
        if let Some(after) = published_after {
            query.push(("publishedAfter", after.to_string()));
        }

        let response = self
            .http
            .get(format!("{}/search", self.base_url.trim_end_matches('/')))
            .query(&query)
            .send()
            .await?;
        let response =
            error_for_status(response, "YouTube search", DigestError::SourceUnavailable).await?;

        response
            .json::<SearchResponse>()
            .await
            .map_err(|e| DigestError::SourceUnavailable(format!("Failed to parse search response: {e}")))
    }
}

#[async_trait]
impl ItemDiscovery for YouTubeClient {
    async fn discover(
        &self,
        source_id: &str,
        max_results: u32,
        published_after: Option<DateTime<Utc>>,
    ) -> Result<Vec<Item>, DigestError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(DigestError::SourceUnavailable(
                "YouTube API key not configured".to_string(),
            ));
        };
        let after = published_after.map(format_published_after);

        let response = with_retry(self.max_retries, || {
            self.search(api_key, source_id, max_results, after.as_deref())
        })
        .await
        .map_err(|e| match e {
            DigestError::HttpError(msg) => DigestError::SourceUnavailable(msg),
            other => other,
        })?;

        let items: Vec<Item> = response
            .items
            .into_iter()
            .filter_map(|result| {
                let Some(id) = result.id.video_id else {
                    warn!("Skipping search result without a video id for {}", source_id);
                    return None;
                };
                Some(Item {
                    id,
                    title: html_escape::decode_html_entities(&result.snippet.title).into_owned(),
                    source_name: html_escape::decode_html_entities(&result.snippet.channel_title)
                        .into_owned(),
                    published_at: result.snippet.published_at,
                })
            })
            .collect();

        info!("Discovered {} items for source {}", items.len(), source_id);
        Ok(items)
    }
}
