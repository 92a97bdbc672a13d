// src/ingest/retry.rs
use std::future::Future;
use std::time::Duration;

use crate::error::FetchError;

/// Fixed-backoff retry policy (constant delay, not exponential).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_secs(2),
        }
    }
}

/// Abstraction over `tokio::time::sleep` so delays can be observed in tests.
#[async_trait::async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, d: Duration);
}

pub struct TokioSleeper;

#[async_trait::async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, d: Duration) {
        tokio::time::sleep(d).await;
    }
}

/// Run `op` until it succeeds, fails permanently, or the attempt budget is
/// spent. `op` receives the 1-based attempt number. The last error is
/// returned on exhaustion.
pub async fn retry<T, F, Fut>(
    policy: RetryPolicy,
    sleeper: &dyn Sleeper,
    label: &str,
    mut op: F,
) -> Result<T, FetchError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let attempts = policy.max_attempts.max(1);
    let mut last_err = None;

    for attempt in 1..=attempts {
        match op(attempt).await {
            Ok(v) => return Ok(v),
            Err(e) if !e.is_transient() => return Err(e),
            Err(e) => {
                let left = attempts - attempt;
                if left > 0 {
                    tracing::warn!(source = label, attempt, attempts_left = left, error = %e, "retrying source");
                    metrics::counter!("ingest_retries_total").increment(1);
                    sleeper.sleep(policy.backoff).await;
                }
                last_err = Some(e);
            }
        }
    }

    Err(last_err.unwrap_or_else(|| FetchError::Network("no attempt made".into())))
}
