//! X (microblog) posting client.

use chrono::Utc;
use reqwest::Client;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use super::http::{build_client, error_for_status};
use super::oauth1::OAuth1Credentials;
use crate::core::config::AppConfig;
use crate::errors::DigestError;

#[derive(Debug, Deserialize)]
struct CreatePostResponse {
    data: Option<CreatedPost>,
}

#[derive(Debug, Deserialize)]
struct CreatedPost {
    id: String,
}

pub struct XClient {
    http: Client,
    credentials: OAuth1Credentials,
    base_url: String,
}

impl XClient {
    #[must_use]
    pub fn new(credentials: OAuth1Credentials, base_url: impl Into<String>) -> Self {
        Self {
            http: build_client(),
            credentials,
            base_url: base_url.into(),
        }
    }

    /// `None` unless the consumer key pair and access token pair are all set.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Option<Self> {
        OAuth1Credentials::from_config(config)
            .map(|credentials| Self::new(credentials, config.x_api_base.clone()))
    }

    /// Publish `text` and return the new post id.
    ///
    /// The request is signed with OAuth 1.0a; the JSON body is not part of
    /// the signature.
    ///
    /// # Errors
    ///
    /// Returns `DistributionFailed` on a rejected request or an unexpected
    /// response shape, `HttpError` on transport failure.
    pub async fn create_post(&self, text: &str) -> Result<String, DigestError> {
        let url = format!("{}/2/tweets", self.base_url.trim_end_matches('/'));
        let nonce = Uuid::new_v4().simple().to_string();
        let authorization = self.credentials.authorization_header(
            "POST",
            &url,
            &[],
            &nonce,
            Utc::now().timestamp(),
        )?;

        let response = self
            .http
            .post(&url)
            .header(AUTHORIZATION, authorization)
            .json(&json!({ "text": text }))
            .send()
            .await?;
        let response =
            error_for_status(response, "X create post", DigestError::DistributionFailed).await?;

        let body: CreatePostResponse = response.json().await.map_err(|e| {
            DigestError::DistributionFailed(format!("Failed to parse post response: {e}"))
        })?;

        let id = body.data.map(|post| post.id).ok_or_else(|| {
            DigestError::DistributionFailed("Unexpected post response format".to_string())
        })?;
        info!("Successfully posted with id {}", id);
        Ok(id)
    }
}
