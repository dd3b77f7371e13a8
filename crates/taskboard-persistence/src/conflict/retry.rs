use std::future::Future;
use std::time::Duration;
use taskboard_core::{RetryConfig, TaskboardResult};

/// Re-runs an operation that lost an optimistic concurrency race.
///
/// Only `Conflict` errors are retried. Each attempt must re-read its state,
/// so the closure builds a fresh future every time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(config.max_attempts, Duration::from_millis(config.backoff_ms))
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub async fn run<T, F, Fut>(&self, operation: &str, mut attempt_fn: F) -> TaskboardResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = TaskboardResult<T>>,
    {
        let mut attempt = 1;
        loop {
            match attempt_fn().await {
                Err(e) if e.is_retryable() && attempt < self.max_attempts => {
                    tracing::warn!(operation, attempt, error = %e, "retrying after conflict");
                    tokio::time::sleep(self.backoff * attempt).await;
                    attempt += 1;
                }
                Err(e) if e.is_retryable() => {
                    tracing::warn!(
                        operation,
                        attempts = attempt,
                        error = %e,
                        "giving up after conflicts"
                    );
                    return Err(e);
                }
                other => return other,
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}
