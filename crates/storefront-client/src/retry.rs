//! Exponential backoff with jitter for transient product API failures.
//!
//! Non-retriable errors (not found, malformed bodies, invalid products, API
//! level failures) are returned immediately.

use std::future::Future;
use std::time::Duration;

use crate::error::ClientError;

const MAX_DELAY_MS: u64 = 30_000;

/// Returns `true` for errors worth retrying after a delay.
///
/// Retriable:
/// - [`ClientError::RateLimited`]: HTTP 429.
/// - [`ClientError::Http`]: network-level failure.
/// - [`ClientError::UnexpectedStatus`] with a 5xx status.
pub(crate) fn is_retriable(err: &ClientError) -> bool {
    match err {
        ClientError::RateLimited { .. } | ClientError::Http(_) => true,
        ClientError::UnexpectedStatus { status, .. } => *status >= 500,
        ClientError::Deserialize { .. }
        | ClientError::NotFound { .. }
        | ClientError::Api { .. }
        | ClientError::InvalidBaseUrl { .. }
        | ClientError::InvalidProduct(_) => false,
    }
}

/// Delay before retry number `attempt` (1-based): `base_ms * 2^(attempt-1)`,
/// capped at 30 s, then scaled by a jitter factor in `[0.75, 1.25)`.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn backoff_delay_ms(backoff_base_ms: u64, attempt: u32) -> u64 {
    let computed = backoff_base_ms.saturating_mul(1u64 << (attempt.saturating_sub(1)).min(16));
    let capped = computed.min(MAX_DELAY_MS);
    (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64
}

/// Delay before retry number `attempt` after `err`. A 429 waits at least its
/// `Retry-After` seconds, still capped at 30 s.
fn retry_delay_ms(err: &ClientError, backoff_base_ms: u64, attempt: u32) -> u64 {
    let backoff = backoff_delay_ms(backoff_base_ms, attempt);
    match err {
        ClientError::RateLimited { retry_after_secs } => retry_after_secs
            .saturating_mul(1_000)
            .min(MAX_DELAY_MS)
            .max(backoff),
        _ => backoff,
    }
}

/// Runs `operation`, retrying retriable errors up to `max_retries` more times.
///
/// With `max_retries = 2` the operation runs at most 3 times. The last error
/// is returned once retries are exhausted.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, ClientError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ClientError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let delay_ms = retry_delay_ms(&err, backoff_base_ms, attempt);
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "transient product API error, retrying after backoff"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
