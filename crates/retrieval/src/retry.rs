//! Retry with backoff for flaky provider calls.

use lectern_core::{AppError, AppResult};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// How the delay grows between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// `base * next_attempt`, so the first retry waits `2 * base`
    Linear,
    /// `base * 2^(attempt - 1)`
    Exponential,
}

/// Configures how often and how patiently an operation is retried.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub backoff: Backoff,
    /// Upper bound for a single delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    /// Three attempts, sleeping 2 s and then 3 s between them.
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            backoff: Backoff::Linear,
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Policy with the given attempt count that never sleeps.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
            backoff: Backoff::Linear,
            max_delay: Duration::ZERO,
        }
    }

    /// Delay to wait after the given failed attempt (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let attempt = attempt.max(1);
        let delay = match self.backoff {
            Backoff::Linear => self.base_delay.saturating_mul(attempt + 1),
            Backoff::Exponential => self
                .base_delay
                .saturating_mul(2u32.saturating_pow(attempt - 1)),
        };
        delay.min(self.max_delay)
    }

    /// Run `op` until it succeeds or attempts are exhausted.
    ///
    /// The error of the last attempt is returned.
    pub async fn run<T, F, Fut>(&self, op_name: &str, mut op: F) -> AppResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        let attempts = self.max_attempts.max(1);
        let mut last_err: Option<AppError> = None;

        for attempt in 1..=attempts {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    if attempt < attempts {
                        let delay = self.delay_after(attempt);
                        warn!(
                            operation = op_name,
                            attempt,
                            max_attempts = attempts,
                            delay_ms = delay.as_millis() as u64,
                            error = %e,
                            "Attempt failed, retrying"
                        );
                        if !delay.is_zero() {
                            tokio::time::sleep(delay).await;
                        }
                    }
                    last_err = Some(e);
                }
            }
        }

        Err(last_err
            .unwrap_or_else(|| AppError::Other(format!("{} made no attempts", op_name))))
    }
}
