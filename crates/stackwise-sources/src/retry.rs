//! Retry with exponential backoff for the HTTP-backed sources.
//!
//! Only transient conditions are retried. Credential, API-level, and parse
//! failures are returned immediately.

use std::future::Future;
use std::time::Duration;

use crate::error::SourceError;

/// Returns `true` if `err` represents a transient condition that should be
/// retried after a backoff delay.
///
/// Retriable errors:
/// - [`SourceError::RateLimited`]: HTTP 429.
/// - [`SourceError::Http`]: timeout or connection failure.
/// - [`SourceError::UnexpectedStatus`] with a 5xx status.
pub(crate) fn is_retriable(err: &SourceError) -> bool {
    match err {
        SourceError::RateLimited { .. } => true,
        SourceError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        SourceError::UnexpectedStatus { status, .. } => (500..600).contains(status),
        SourceError::Deserialize { .. }
        | SourceError::Api { .. }
        | SourceError::MissingCredential(_)
        | SourceError::InvalidBaseUrl { .. } => false,
    }
}

/// Executes `operation` with exponential backoff retries on transient errors.
///
/// On a retriable error the function sleeps for
/// `backoff_base_secs * 2^attempt` seconds (±25% jitter) and tries again, up
/// to `max_retries` additional attempts. With `max_retries = 2` the operation
/// runs at most 3 times. The delay is capped at 60 s.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, SourceError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SourceError>>,
{
    const MAX_DELAY_MS: u64 = 60_000;
    let mut attempt = 0u32;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        if !is_retriable(&err) || attempt >= max_retries {
            return Err(err);
        }

        let computed = backoff_base_secs
            .saturating_mul(1_000)
            .saturating_mul(1u64 << attempt.min(10));
        let capped = computed.min(MAX_DELAY_MS);
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            clippy::cast_precision_loss
        )]
        let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
        tracing::warn!(
            attempt,
            max_retries,
            delay_ms,
            error = %err,
            "transient source error, retrying after backoff"
        );
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        attempt += 1;
    }
}
