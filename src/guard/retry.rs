//! Bounded retry with capped exponential backoff.
//!
//! Only errors whose [`Retryable::is_retryable`] is true are retried. Validation failures,
//! insufficient stock and every other terminal error return on the first attempt.

use crate::config::RetryConfig;
use crate::error::{Outcome, Retryable};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(2000),
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            base_delay: Duration::from_millis(config.base_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
        }
    }
}

impl RetryPolicy {
    /// A single attempt, no retries.
    pub fn once() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delay after the `attempt`-th failure (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32 << attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Retries `call` for idempotent operations, where repeating a write that may already have
    /// landed is harmless.
    ///
    /// If any attempt ended with an unknown outcome, the final error says so too.
    pub async fn retry<T, E, F, Fut>(&self, operation: &'static str, call: F) -> Result<T, E>
    where
        E: Retryable + Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.run(operation, call, true).await
    }

    /// Retries `call` only while the store reports the request was never applied.
    ///
    /// Used for writes that are not idempotent: once an attempt may have landed, repeating it
    /// could apply it twice, so the unknown outcome is returned to the caller instead.
    pub async fn retry_if_not_applied<T, E, F, Fut>(
        &self,
        operation: &'static str,
        call: F,
    ) -> Result<T, E>
    where
        E: Retryable + Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.run(operation, call, false).await
    }

    async fn run<T, E, F, Fut>(
        &self,
        operation: &'static str,
        mut call: F,
        idempotent: bool,
    ) -> Result<T, E>
    where
        E: Retryable + Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut uncertain = false;
        let mut attempt = 1;
        loop {
            let err = match call().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };
            uncertain |= err.outcome() == Some(Outcome::Unknown);

            let may_repeat = idempotent || err.outcome() == Some(Outcome::NotApplied);
            if !err.is_retryable() || !may_repeat || attempt >= self.max_attempts {
                return Err(if uncertain { err.into_uncertain() } else { err });
            }

            let delay = self.delay_for(attempt);
            warn!(
                operation,
                attempt,
                max_attempts = self.max_attempts,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "Remote call failed, retrying"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}
