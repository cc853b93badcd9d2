//! Exponential back-off for transient search provider failures.

use std::future::Future;
use std::time::Duration;

use crate::error::SerpError;

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// Network failures, 429 and 5xx are transient. Auth failures, provider-level
/// errors and undecodable bodies are returned immediately.
pub(crate) fn is_retriable(err: &SerpError) -> bool {
    match err {
        SerpError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
        SerpError::RateLimited { .. } => true,
        SerpError::UnexpectedStatus { status, .. } => *status >= 500,
        SerpError::ApiError(_)
        | SerpError::Deserialize { .. }
        | SerpError::MissingApiKey
        | SerpError::InvalidBaseUrl { .. } => false,
    }
}

/// Longest `Retry-After` honoured between attempts.
pub const MAX_RETRY_AFTER_SECS: u64 = 10;

fn backoff_secs(backoff_base_secs: u64, attempt: u32) -> u64 {
    backoff_base_secs.saturating_mul(1u64 << attempt.min(62))
}

fn delay_secs(err: &SerpError, backoff_base_secs: u64, attempt: u32) -> u64 {
    let backoff = backoff_secs(backoff_base_secs, attempt);
    match err {
        SerpError::RateLimited { retry_after_secs } => {
            backoff.max((*retry_after_secs).min(MAX_RETRY_AFTER_SECS))
        }
        _ => backoff,
    }
}

/// Upper bound on the total time [`retry_with_backoff`] spends sleeping.
#[must_use]
pub fn max_total_backoff(max_retries: u32, backoff_base_secs: u64) -> Duration {
    let secs = (0..max_retries).fold(0u64, |total, attempt| {
        total.saturating_add(backoff_secs(backoff_base_secs, attempt).max(MAX_RETRY_AFTER_SECS))
    });
    Duration::from_secs(secs)
}

/// Runs `operation` with up to `max_retries` additional attempts on transient errors.
///
/// Sleeps `backoff_base_secs * 2^attempt` seconds between attempts; a 429 that
/// carried a longer `Retry-After` waits that long instead, up to
/// [`MAX_RETRY_AFTER_SECS`].
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, SerpError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SerpError>>,
{
    let mut attempt = 0u32;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        if !is_retriable(&err) || attempt >= max_retries {
            return Err(err);
        }

        let delay_secs = delay_secs(&err, backoff_base_secs, attempt);
        tracing::warn!(
            attempt,
            max_retries,
            delay_secs,
            error = %err,
            "transient search provider error, retrying after backoff"
        );
        tokio::time::sleep(Duration::from_secs(delay_secs)).await;
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn server_error() -> SerpError {
        SerpError::UnexpectedStatus {
            status: 502,
            context: "search(q=test)".to_owned(),
        }
    }

    #[test]
    fn client_errors_are_not_retriable() {
        assert!(!is_retriable(&SerpError::UnexpectedStatus {
            status: 401,
            context: "search(q=test)".to_owned(),
        }));
        assert!(!is_retriable(&SerpError::ApiError("bad key".to_owned())));
        assert!(!is_retriable(&SerpError::MissingApiKey));
    }

    #[test]
    fn server_errors_and_rate_limits_are_retriable() {
        assert!(is_retriable(&server_error()));
        assert!(is_retriable(&SerpError::RateLimited {
            retry_after_secs: 0
        }));
    }

    #[test]
    fn total_backoff_sums_every_sleep() {
        assert_eq!(max_total_backoff(0, 5), Duration::ZERO);
        // 10 + 10 + 10 with the Retry-After floor.
        assert_eq!(max_total_backoff(3, 1), Duration::from_secs(30));
        // 8 + 16 + 32 once the exponential term dominates.
        assert_eq!(max_total_backoff(3, 8), Duration::from_secs(56));
    }

    #[test]
    fn long_retry_after_is_capped() {
        let limited = |secs| SerpError::RateLimited {
            retry_after_secs: secs,
        };
        assert_eq!(delay_secs(&limited(3600), 1, 0), MAX_RETRY_AFTER_SECS);
        assert_eq!(delay_secs(&limited(4), 1, 0), 4);
        assert_eq!(delay_secs(&limited(0), 2, 1), 4);
        assert_eq!(delay_secs(&server_error(), 3, 2), 12);
    }

    #[tokio::test]
    async fn succeeds_immediately_on_first_try() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok::<u32, SerpError>(7)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_server_error_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(2, 0, || {
            let c = Arc::clone(&c);
            async move {
                if c.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(server_error())
                } else {
                    Ok::<u32, SerpError>(11)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 11);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(2, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, SerpError>(server_error())
            }
        })
        .await;
        // max_retries=2 → 3 total attempts
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(matches!(
            result,
            Err(SerpError::UnexpectedStatus { status: 502, .. })
        ));
    }

    #[tokio::test]
    async fn does_not_retry_api_error() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, SerpError>(SerpError::ApiError("invalid api_key".to_owned()))
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(SerpError::ApiError(_))));
    }
}
