use std::{future::Future, time::Duration};

use tokio::time::sleep;
use tracing::warn;

/// Configuration for exponential backoff retry.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Backoff before the first retry.
    pub initial_backoff: Duration,
    /// Upper bound for a single backoff.
    pub max_backoff: Duration,
    /// Multiplier applied after each failed attempt.
    pub multiplier: u32,
    /// Maximum number of retries after the first attempt.
    pub max_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_backoff: Duration::from_millis(250),
            max_backoff: Duration::from_secs(30),
            multiplier: 2,
            max_retries: 3,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay_ms: u64) -> Self {
        Self {
            initial_backoff: Duration::from_millis(base_delay_ms),
            max_retries,
            ..Self::default()
        }
    }

    /// Backoff following `current`, saturating at `max_backoff`.
    pub fn next_backoff(&self, current: Duration) -> Duration {
        current
            .checked_mul(self.multiplier)
            .unwrap_or(self.max_backoff)
            .min(self.max_backoff)
    }
}

/// Runs `operation` until it succeeds, fails with an error `should_retry`
/// rejects, or the policy's retries are used up. Returns the last outcome.
pub async fn retry_with_backoff<F, Fut, T, E>(
    policy: &RetryPolicy,
    should_retry: impl Fn(&E) -> bool,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut backoff = policy.initial_backoff.min(policy.max_backoff);

    for attempt in 1..=policy.max_retries {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if should_retry(&err) => {
                warn!(attempt, backoff_ms = backoff.as_millis() as u64, error = %err, "retrying request");
                sleep(backoff).await;
                backoff = policy.next_backoff(backoff);
            }
            Err(err) => return Err(err),
        }
    }

    operation().await
}
