//! Retry with exponential back-off and jitter for event store page requests.

use std::future::Future;
use std::time::Duration;

use crate::error::EventsError;

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// Retriable: network-level failures (timeout, connection reset) and 5xx/429
/// response statuses. Not retriable: 4xx statuses and malformed responses,
/// since retrying won't fix either.
pub(crate) fn is_retriable(err: &EventsError) -> bool {
    match err {
        EventsError::Http(e) => e.is_timeout() || e.is_connect(),
        EventsError::Status { status, .. } => *status >= 500 || *status == 429,
        EventsError::Deserialize { .. } => false,
    }
}

/// Runs `operation` with up to `max_retries` additional attempts on transient
/// errors. Delay doubles per attempt from `backoff_base_ms`, jittered ±25% and
/// capped at 60 s. Non-retriable errors are returned immediately.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, EventsError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, EventsError>>,
{
    const MAX_DELAY_MS: u64 = 60_000;
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
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
                    "event store transient error; retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn status_err(status: u16) -> EventsError {
        EventsError::Status {
            status,
            context: "test".to_string(),
        }
    }

    fn deserialize_err() -> EventsError {
        let src = serde_json::from_str::<()>("invalid").unwrap_err();
        EventsError::Deserialize {
            context: "test".to_string(),
            source: src,
        }
    }

    #[test]
    fn server_errors_are_retriable() {
        assert!(is_retriable(&status_err(500)));
        assert!(is_retriable(&status_err(503)));
        assert!(is_retriable(&status_err(429)));
    }

    #[test]
    fn client_errors_are_not_retriable() {
        assert!(!is_retriable(&status_err(404)));
        assert!(!is_retriable(&status_err(400)));
    }

    #[test]
    fn deserialize_errors_are_not_retriable() {
        assert!(!is_retriable(&deserialize_err()));
    }

    #[tokio::test]
    async fn retries_until_success() {
        let calls = AtomicU32::new(0);
        let result = retry_with_backoff(3, 1, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(status_err(500))
                } else {
                    Ok(n)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn non_retriable_error_returns_immediately() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = retry_with_backoff(3, 1, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(status_err(404)) }
        })
        .await;
        assert!(matches!(
            result,
            Err(EventsError::Status { status: 404, .. })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_exhausted_returns_last_error() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = retry_with_backoff(2, 1, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(status_err(500)) }
        })
        .await;
        assert!(matches!(
            result,
            Err(EventsError::Status { status: 500, .. })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
