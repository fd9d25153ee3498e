//! Storage retry functionality.
//!
//! Wraps persistence adapter calls with a bounded number of attempts and an
//! exponentially increasing delay. Exhaustion hands back the last storage
//! error; it never panics.

use atelier_storage::StorageResult;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Initial retry delay in milliseconds.
pub const RETRY_INITIAL_DELAY_MS: u64 = 200;

/// Backoff factor for exponential delay.
pub const RETRY_BACKOFF_FACTOR: u32 = 2;

/// Upper bound on a single retry delay.
pub const RETRY_MAX_DELAY_MS: u64 = 2_000;

/// Total attempts per storage call, including the first.
pub const RETRY_MAX_ATTEMPTS: u32 = 3;

/// Retry settings for persistence adapter calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. At least 1.
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub backoff_factor: u32,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: RETRY_MAX_ATTEMPTS,
            initial_delay: Duration::from_millis(RETRY_INITIAL_DELAY_MS),
            backoff_factor: RETRY_BACKOFF_FACTOR,
            max_delay: Duration::from_millis(RETRY_MAX_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    /// A policy that tries once and never sleeps.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Calculate the delay before retry number `retry` (1-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = self
            .backoff_factor
            .max(1)
            .saturating_pow(retry.saturating_sub(1));
        self.initial_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// Run `op` until it succeeds, fails with a non-transient error, or the
    /// attempts are used up.
    pub async fn run<T, F, Fut>(&self, label: &str, mut op: F) -> StorageResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = StorageResult<T>>,
    {
        let mut helper = RetryHelper::new(self);
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if !e.is_transient() => return Err(e),
                Err(e) => match helper.next_attempt() {
                    Some(delay) => {
                        debug!(
                            operation = label,
                            error = %e,
                            retry = helper.current_attempt(),
                            delay_ms = delay.as_millis() as u64,
                            "Storage call failed, retrying"
                        );
                        tokio::time::sleep(delay).await;
                    }
                    None => {
                        warn!(
                            operation = label,
                            error = %e,
                            attempts = self.max_attempts.max(1),
                            "Storage call failed, giving up"
                        );
                        return Err(e);
                    }
                },
            }
        }
    }
}

/// Tracks retries for a single call.
struct RetryHelper<'a> {
    policy: &'a RetryPolicy,
    current_attempt: u32,
}

impl<'a> RetryHelper<'a> {
    fn new(policy: &'a RetryPolicy) -> Self {
        Self {
            policy,
            current_attempt: 0,
        }
    }

    /// Returns the delay before the next retry, or `None` when exhausted.
    fn next_attempt(&mut self) -> Option<Duration> {
        self.current_attempt += 1;
        if self.current_attempt >= self.policy.max_attempts.max(1) {
            return None;
        }
        Some(self.policy.delay_for(self.current_attempt))
    }

    fn current_attempt(&self) -> u32 {
        self.current_attempt
    }
}
