//! OAuth 1.0a request signing (HMAC-SHA1) for user-context X calls.

use base64::{Engine as _, engine::general_purpose};
use hmac::{Hmac, Mac};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use sha1::Sha1;

use crate::core::config::AppConfig;
use crate::errors::DigestError;

/// Unreserved characters from RFC 3986 stay literal, everything else is escaped.
const OAUTH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

const SIGNATURE_METHOD: &str = "HMAC-SHA1";
const OAUTH_VERSION: &str = "1.0";

fn encode(value: &str) -> String {
    utf8_percent_encode(value, OAUTH_ENCODE_SET).to_string()
}

/// Consumer key pair plus the posting account's access token pair.
#[derive(Clone)]
pub struct OAuth1Credentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub access_token: String,
    pub access_token_secret: String,
}

impl std::fmt::Debug for OAuth1Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuth1Credentials")
            .field("consumer_key", &self.consumer_key)
            .field("access_token", &self.access_token)
            .finish_non_exhaustive()
    }
}

impl OAuth1Credentials {
    /// `None` unless all four values are configured.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Option<Self> {
        Some(Self {
            consumer_key: config.twitter_api_key.clone()?,
            consumer_secret: config.twitter_api_secret.clone()?,
            access_token: config.twitter_access_token.clone()?,
            access_token_secret: config.twitter_access_token_secret.clone()?,
        })
    }

    /// Build the `Authorization` header value for one request.
    ///
    /// `params` are the query or form parameters that take part in the
    /// signature. A JSON body does not.
    ///
    /// # Errors
    ///
    /// Returns `DistributionFailed` if the signing key is rejected.
    pub fn authorization_header(
        &self,
        method: &str,
        url: &str,
        params: &[(&str, &str)],
        nonce: &str,
        timestamp: i64,
    ) -> Result<String, DigestError> {
        let timestamp = timestamp.to_string();
        let mut oauth_params = vec![
            ("oauth_consumer_key", self.consumer_key.as_str()),
            ("oauth_nonce", nonce),
            ("oauth_signature_method", SIGNATURE_METHOD),
            ("oauth_timestamp", timestamp.as_str()),
            ("oauth_token", self.access_token.as_str()),
            ("oauth_version", OAUTH_VERSION),
        ];

        let mut signed: Vec<(&str, &str)> = oauth_params.clone();
        signed.extend_from_slice(params);
        let base = signature_base_string(method, url, &signed);
        let signature = self.sign(&base)?;
        oauth_params.push(("oauth_signature", signature.as_str()));
        oauth_params.sort_unstable();

        let fields = oauth_params
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", encode(k), encode(v)))
            .collect::<Vec<_>>()
            .join(", ");
        Ok(format!("OAuth {fields}"))
    }

    fn sign(&self, base_string: &str) -> Result<String, DigestError> {
        let key = format!(
            "{}&{}",
            encode(&self.consumer_secret),
            encode(&self.access_token_secret)
        );
        let mut mac = Hmac::<Sha1>::new_from_slice(key.as_bytes())
            .map_err(|e| DigestError::DistributionFailed(format!("Invalid signing key: {e}")))?;
        mac.update(base_string.as_bytes());
        Ok(general_purpose::STANDARD.encode(mac.finalize().into_bytes()))
    }
}

/// `METHOD&url&params` with every parameter encoded, sorted and joined.
#[must_use]
pub fn signature_base_string(method: &str, url: &str, params: &[(&str, &str)]) -> String {
    let mut pairs: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (encode(k), encode(v)))
        .collect();
    pairs.sort();
    let joined = pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.to_ascii_uppercase(),
        encode(url),
        encode(&joined)
    )
}
