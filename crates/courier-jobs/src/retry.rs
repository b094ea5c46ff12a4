//! Retry policy for failed deliveries.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What to do with a job after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Re-queue after the given delay.
    Retry(Duration),
    /// Budget exhausted, dead-letter the job.
    Exhausted,
}

/// Linear backoff policy: the nth retry waits `n * step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Maximum number of retries.
    pub max_retries: u32,

    /// Backoff step in milliseconds.
    pub step_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::linear(3, Duration::from_secs(1))
    }
}

impl RetryPolicy {
    /// Creates a linear backoff policy.
    pub fn linear(max_retries: u32, step: Duration) -> Self {
        Self {
            max_retries,
            step_ms: u64::try_from(step.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Returns the backoff step.
    pub fn step(&self) -> Duration {
        Duration::from_millis(self.step_ms)
    }

    /// Returns true if a job with `retries` failed attempts may be retried.
    pub fn should_retry(&self, retries: u32) -> bool {
        retries <= self.max_retries
    }

    /// Calculate delay for the given attempt number.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.step_ms.saturating_mul(u64::from(attempt)))
    }

    /// Decides the fate of a job that now has `retries` failed attempts.
    pub fn decide(&self, retries: u32) -> RetryDecision {
        if retries > 0 && self.should_retry(retries) {
            RetryDecision::Retry(self.delay_for_attempt(retries))
        } else {
            RetryDecision::Exhausted
        }
    }
}
