//! Exponential backoff with jitter for flaky network calls

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::shared::errors::RegistryError;

/// Lower bound of the jitter multiplier
pub const JITTER_MIN: f64 = 0.75;
/// Upper bound of the jitter multiplier
pub const JITTER_MAX: f64 = 1.25;

/// Errors that know whether another attempt can help
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

impl Retryable for RegistryError {
    fn is_retryable(&self) -> bool {
        RegistryError::is_retryable(self)
    }
}

/// Retry settings, also readable from the `[retry]` config section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_factor: f64,
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay_ms: 500,
            max_delay_ms: 10_000,
            backoff_factor: 2.0,
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// Delay that follows `current_ms`, capped at `max_delay_ms` (before jitter)
    pub fn next_delay_ms(&self, current_ms: f64) -> f64 {
        (current_ms * self.backoff_factor).min(self.max_delay_ms as f64)
    }

    fn jittered(&self, delay_ms: f64) -> f64 {
        if self.jitter {
            delay_ms * rand::thread_rng().gen_range(JITTER_MIN..=JITTER_MAX)
        } else {
            delay_ms
        }
    }
}

/// Runs `operation` until it succeeds, fails terminally, or `max_attempts` is reached.
///
/// Terminal errors are returned on first occurrence. After the last allowed attempt the
/// last retryable error is returned as is.
pub async fn execute_with_retry<T, E, F, Fut>(
    policy: &RetryPolicy,
    operation_name: &str,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable + Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    let mut delay_ms = policy.initial_delay_ms as f64;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if !err.is_retryable() || attempt >= max_attempts {
            return Err(err);
        }

        delay_ms = policy.next_delay_ms(delay_ms);
        let actual_delay = policy.jittered(delay_ms).round() as u64;

        warn!(
            operation = operation_name,
            attempt,
            max_attempts,
            delay_ms = actual_delay,
            error = %err,
            "Request failed, retrying"
        );

        tokio::time::sleep(Duration::from_millis(actual_delay)).await;
        attempt += 1;
    }
}
