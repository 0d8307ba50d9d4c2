//! Shared HTTP plumbing for the API clients.

use reqwest::{Client, Response, StatusCode};
use std::future::Future;
use std::time::Duration;
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};

use crate::errors::DigestError;

const REQUEST_TIMEOUT_SECS: u64 = 30;
const RETRY_BASE: u64 = 2;
const RETRY_FACTOR_MILLIS: u64 = 100;
const RETRY_MAX_DELAY_SECS: u64 = 5;

pub(crate) fn build_client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Run `operation`, retrying transient failures up to `max_retries` times
/// with jittered exponential backoff. `max_retries == 0` runs it once.
pub(crate) async fn with_retry<F, Fut, T>(max_retries: usize, operation: F) -> Result<T, DigestError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DigestError>>,
{
    // 200ms, 400ms, 800ms... before jitter
    let strategy = ExponentialBackoff::from_millis(RETRY_BASE)
        .factor(RETRY_FACTOR_MILLIS)
        .max_delay(Duration::from_secs(RETRY_MAX_DELAY_SECS))
        .map(jitter)
        .take(max_retries);

    RetryIf::start(strategy, operation, |e: &DigestError| e.is_transient()).await
}

/// Map a non-success response to an error, keeping 5xx and 429 retryable.
pub(crate) async fn error_for_status(
    response: Response,
    context: &str,
    permanent: fn(String) -> DigestError,
) -> Result<Response, DigestError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|e| format!("<failed to read body: {e}>"));
    let message = format!("{context}: status={status} body={body}");

    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        Err(DigestError::HttpError(message))
    } else {
        Err(permanent(message))
    }
}
