//! Exponential backoff with jitter for external calls.

use rand::Rng;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

use crate::config::RequestConfig;
use crate::error::LlmError;

/// Status codes the provider uses to signal transient overload
const OVERLOAD_STATUSES: [u16; 3] = [429, 503, 529];

/// Retry policy: bounded retries, exponential base delay, random jitter,
/// and a predicate deciding which errors are worth retrying.
pub struct RetryPolicy<E = LlmError> {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each subsequent one.
    pub base_delay_ms: u64,
    /// Upper bound of the uniform jitter added to each delay.
    pub max_jitter_ms: u64,
    retryable: fn(&E) -> bool,
}

impl<E> RetryPolicy<E> {
    /// Create a policy with an explicit retry predicate
    pub fn new(
        max_retries: u32,
        base_delay_ms: u64,
        max_jitter_ms: u64,
        retryable: fn(&E) -> bool,
    ) -> Self {
        Self {
            max_retries,
            base_delay_ms,
            max_jitter_ms,
            retryable,
        }
    }

    /// A policy that never retries
    pub fn none() -> Self {
        Self::new(0, 0, 0, never_retry::<E>)
    }

    /// Whether `err` qualifies for another attempt
    pub fn is_retryable(&self, err: &E) -> bool {
        (self.retryable)(err)
    }

    /// Deterministic part of the delay before retry number `retry` (0-based)
    pub fn base_delay(&self, retry: u32) -> Duration {
        let factor = 2_u64.checked_pow(retry).unwrap_or(u64::MAX);
        Duration::from_millis(self.base_delay_ms.saturating_mul(factor))
    }

    /// Full delay before retry number `retry`, jitter included
    pub fn delay_for(&self, retry: u32) -> Duration {
        let jitter = if self.max_jitter_ms == 0 {
            0
        } else {
            rand::rng().random_range(0..=self.max_jitter_ms)
        };
        self.base_delay(retry) + Duration::from_millis(jitter)
    }

    /// Run `operation`, retrying retryable failures until the bound is hit.
    ///
    /// Non-retryable errors and the last error after exhaustion are
    /// returned unchanged.
    pub async fn run<T, F, Fut>(&self, label: &str, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        let mut retry = 0;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if retry < self.max_retries && self.is_retryable(&e) => {
                    let delay = self.delay_for(retry);
                    warn!(
                        operation = %label,
                        retry = retry + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Transient failure, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    retry += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl RetryPolicy<LlmError> {
    /// Overload-only policy built from request settings
    pub fn from_config(config: &RequestConfig) -> Self {
        Self::new(
            config.max_retries,
            config.retry_delay_ms,
            config.retry_jitter_ms,
            is_overloaded,
        )
    }
}

impl Default for RetryPolicy<LlmError> {
    fn default() -> Self {
        Self::from_config(&RequestConfig::default())
    }
}

impl<E> Clone for RetryPolicy<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for RetryPolicy<E> {}

impl<E> fmt::Debug for RetryPolicy<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_retries", &self.max_retries)
            .field("base_delay_ms", &self.base_delay_ms)
            .field("max_jitter_ms", &self.max_jitter_ms)
            .finish()
    }
}

fn never_retry<E>(_: &E) -> bool {
    false
}

/// True when the provider reports transient overload
pub fn is_overloaded(err: &LlmError) -> bool {
    match err {
        LlmError::Api { status, message } => {
            if OVERLOAD_STATUSES.contains(status) {
                return true;
            }
            let message = message.to_lowercase();
            message.contains("overloaded")
                || message.contains("unavailable")
                || message.contains("resource_exhausted")
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;
    use tokio::time::Instant;

    fn overloaded() -> LlmError {
        LlmError::Api {
            status: 503,
            message: "The model is overloaded.".to_string(),
        }
    }

    fn bad_request() -> LlmError {
        LlmError::Api {
            status: 400,
            message: "Invalid argument".to_string(),
        }
    }

    #[test]
    fn test_overload_detection() {
        assert!(is_overloaded(&overloaded()));
        assert!(is_overloaded(&LlmError::Api {
            status: 429,
            message: String::new()
        }));
        assert!(is_overloaded(&LlmError::Api {
            status: 500,
            message: "backend UNAVAILABLE".to_string()
        }));
        assert!(!is_overloaded(&bad_request()));
        assert!(!is_overloaded(&LlmError::Timeout { timeout_ms: 10 }));
        assert!(!is_overloaded(&LlmError::InvalidResponse {
            message: "overloaded".to_string()
        }));
    }

    #[test]
    fn test_base_delay_doubles() {
        let policy = RetryPolicy::new(3, 1000, 0, is_overloaded);
        assert_eq!(policy.base_delay(0), Duration::from_millis(1000));
        assert_eq!(policy.base_delay(1), Duration::from_millis(2000));
        assert_eq!(policy.base_delay(2), Duration::from_millis(4000));
        assert_eq!(policy.delay_for(2), Duration::from_millis(4000));
    }

    #[test]
    fn test_jitter_stays_in_bounds() {
        let policy = RetryPolicy::new(3, 1000, 250, is_overloaded);
        for _ in 0..50 {
            let delay = policy.delay_for(1);
            assert!(delay >= Duration::from_millis(2000));
            assert!(delay <= Duration::from_millis(2250));
        }
    }

    #[test]
    fn test_base_delay_saturates() {
        let policy = RetryPolicy::new(100, u64::MAX / 2, 0, is_overloaded);
        assert_eq!(policy.base_delay(80), Duration::from_millis(u64::MAX));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_overload_then_succeeds_with_growing_delays() {
        let policy = RetryPolicy::new(3, 1000, 500, is_overloaded);
        let calls = AtomicU32::new(0);
        let seen = Mutex::new(Vec::new());

        let result = policy
            .run("test", || {
                seen.lock().unwrap().push(Instant::now());
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err(overloaded())
                    } else {
                        Ok("done")
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        let seen = seen.lock().unwrap();
        let first_gap = seen[1] - seen[0];
        let second_gap = seen[2] - seen[1];
        assert!(first_gap >= Duration::from_millis(1000));
        assert!(first_gap <= Duration::from_millis(1500));
        assert!(second_gap >= Duration::from_millis(2000));
        assert!(second_gap > first_gap);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_overload_error_propagates_immediately() {
        let policy = RetryPolicy::new(3, 1000, 0, is_overloaded);
        let calls = AtomicU32::new(0);
        let start = Instant::now();

        let result: Result<(), LlmError> = policy
            .run("test", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(bad_request()) }
            })
            .await;

        assert!(matches!(result, Err(LlmError::Api { status: 400, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_retries_return_last_error_unchanged() {
        let policy = RetryPolicy::new(2, 100, 0, is_overloaded);
        let calls = AtomicU32::new(0);

        let result: Result<(), LlmError> = policy
            .run("test", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(overloaded()) }
            })
            .await;

        match result {
            Err(LlmError::Api { status, message }) => {
                assert_eq!(status, 503);
                assert_eq!(message, "The model is overloaded.");
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_none_policy_never_retries() {
        let policy: RetryPolicy<LlmError> = RetryPolicy::none();
        let calls = AtomicU32::new(0);

        let result: Result<(), LlmError> = policy
            .run("test", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(overloaded()) }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
