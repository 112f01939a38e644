//! Exponential backoff with jitter, applied to every upstream call.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

use crate::error::{ApiError, HarvestError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    /// Upper bound of the random delay added to each backoff
    pub jitter_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff_ms: 1_000,
            max_backoff_ms: 10_000,
            jitter_ms: 1_000,
        }
    }
}

impl RetryPolicy {
    /// A policy that retries without sleeping
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_backoff_ms: 0,
            max_backoff_ms: 0,
            jitter_ms: 0,
        }
    }

    /// Delay before the attempt following `attempt` (1-based).
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        let base = self.initial_backoff_ms.saturating_mul(1u64 << exponent);
        let jitter = if self.jitter_ms == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..=self.jitter_ms)
        };
        Duration::from_millis(base.saturating_add(jitter).min(self.max_backoff_ms))
    }

    /// Run `op` until it succeeds, fails permanently, or the attempts run out.
    pub async fn run<T, F, Fut>(&self, context: &str, mut op: F) -> Result<T, HarvestError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if !err.is_transient() => {
                    return Err(HarvestError::Upstream {
                        context: context.to_string(),
                        source: err,
                    });
                }
                Err(err) if attempt >= max_attempts => {
                    return Err(HarvestError::UpstreamExhausted {
                        context: context.to_string(),
                        attempts: attempt,
                        source: err,
                    });
                }
                Err(err) => {
                    let delay = self.backoff_delay(attempt);
                    warn!(
                        "{} failed (attempt {}/{}), retrying in {:?}: {}",
                        context, attempt, max_attempts, delay, err
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn unavailable() -> ApiError {
        ApiError::Status {
            operation: "searchText",
            status: 503,
            body: "backend unavailable".into(),
        }
    }

    #[test]
    fn test_backoff_grows_and_caps() {
        let policy = RetryPolicy {
            jitter_ms: 0,
            ..Default::default()
        };
        assert_eq!(policy.backoff_delay(1), Duration::from_secs(1));
        assert_eq!(policy.backoff_delay(2), Duration::from_secs(2));
        assert_eq!(policy.backoff_delay(3), Duration::from_secs(4));
        assert_eq!(policy.backoff_delay(5), Duration::from_secs(10));
        assert_eq!(policy.backoff_delay(40), Duration::from_secs(10));
    }

    #[test]
    fn test_jitter_stays_in_bounds() {
        let policy = RetryPolicy::default();
        for _ in 0..50 {
            let delay = policy.backoff_delay(1);
            assert!(delay >= Duration::from_secs(1));
            assert!(delay <= Duration::from_secs(2));
        }
    }

    #[tokio::test]
    async fn test_recovers_after_one_failure() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result = RetryPolicy::immediate(5)
            .run("search 'cafe'", move || async move {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(unavailable())
                } else {
                    Ok(42)
                }
            })
            .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_exhausts_attempt_bound() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result: Result<(), _> = RetryPolicy::immediate(4)
            .run("search 'cafe'", move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(unavailable())
            })
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        match result {
            Err(HarvestError::UpstreamExhausted {
                attempts, source, ..
            }) => {
                assert_eq!(attempts, 4);
                assert_eq!(source.status(), Some(503));
            }
            other => panic!("expected UpstreamExhausted, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_permanent_error_not_retried() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result: Result<(), _> = RetryPolicy::immediate(5)
            .run("details 'abc'", move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(ApiError::Status {
                    operation: "details",
                    status: 404,
                    body: "not found".into(),
                })
            })
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(HarvestError::Upstream { .. })));
    }
}
