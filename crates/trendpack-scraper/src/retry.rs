//! Retry with exponential backoff for outbound source fetches.
//!
//! [`retry_with_backoff`] wraps any fallible async operation and retries on
//! errors whose [`ScrapeError::is_retryable`] classification allows it.
//! Terminal errors (parse failures, 401/403, 4xx statuses) are returned
//! immediately without retrying.

use std::future::Future;
use std::time::Duration;

use crate::error::ScrapeError;

/// Executes `operation` with up to `max_retries` additional attempts on
/// retryable errors.
///
/// The sleep before the n-th retry is `base_delay_ms * 2^(n-1)` — with a base
/// of 1 000 ms the schedule is 1 s, 2 s, 4 s. There is deliberately no
/// jitter: callers observe the exact schedule. With `max_retries = 2` the
/// operation runs at most 3 times.
///
/// Non-retryable errors are returned immediately; after exhausting retries
/// the last error is returned.
pub async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    base_delay_ms: u64,
    mut operation: F,
) -> Result<T, ScrapeError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScrapeError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !err.is_retryable() || attempt >= max_retries {
                    return Err(err);
                }
                let delay_ms = base_delay_ms.saturating_mul(1u64 << attempt.min(20));
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "transient fetch error, retrying after backoff"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                attempt += 1;
            }
        }
    }
}
