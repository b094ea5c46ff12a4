//! Engine configuration.

use crate::retry::RetryPolicy;
use courier_config::JobsConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings the engine is built with. Never re-read after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Number of concurrent workers.
    pub workers: usize,

    /// Primary queue capacity.
    pub queue_capacity: usize,

    /// Retry queue capacity.
    pub retry_capacity: usize,

    /// Retry policy for failed deliveries.
    pub retry_policy: RetryPolicy,

    /// Queue depth sampling interval in milliseconds.
    pub monitor_interval_ms: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::new(3, 100)
    }
}

impl ServiceConfig {
    /// Creates a configuration with the given worker count and primary
    /// capacity. The retry queue gets half the capacity, at least one slot.
    pub fn new(workers: usize, queue_capacity: usize) -> Self {
        Self {
            workers,
            queue_capacity,
            retry_capacity: (queue_capacity / 2).max(1),
            retry_policy: RetryPolicy::default(),
            monitor_interval_ms: 1000,
        }
    }

    /// Sets the retry policy.
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Sets the monitor interval, rounded to whole milliseconds with a
    /// floor of one.
    pub fn with_monitor_interval(mut self, interval: Duration) -> Self {
        self.monitor_interval_ms = u64::try_from(interval.as_millis())
            .unwrap_or(u64::MAX)
            .max(1);
        self
    }

    /// Returns the monitor interval as Duration. Never zero.
    pub fn monitor_interval(&self) -> Duration {
        Duration::from_millis(self.monitor_interval_ms.max(1))
    }
}

impl From<&JobsConfig> for ServiceConfig {
    fn from(config: &JobsConfig) -> Self {
        Self {
            workers: config.workers,
            queue_capacity: config.queue_size,
            retry_capacity: config.retry_queue_size(),
            retry_policy: RetryPolicy::linear(config.max_retries, config.retry_backoff()),
            monitor_interval_ms: config.monitor_interval_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_capacity_is_half_of_primary() {
        assert_eq!(ServiceConfig::new(3, 100).retry_capacity, 50);
        assert_eq!(ServiceConfig::new(3, 7).retry_capacity, 3);
        assert_eq!(ServiceConfig::new(3, 1).retry_capacity, 1);
    }

    #[test]
    fn test_from_jobs_config() {
        let jobs = JobsConfig {
            workers: 5,
            queue_size: 20,
            max_retries: 2,
            retry_backoff_ms: 500,
            ..JobsConfig::default()
        };
        let config = ServiceConfig::from(&jobs);

        assert_eq!(config.workers, 5);
        assert_eq!(config.queue_capacity, 20);
        assert_eq!(config.retry_capacity, 10);
        assert_eq!(config.retry_policy.max_retries, 2);
        assert_eq!(config.retry_policy.step(), Duration::from_millis(500));
        assert_eq!(config.monitor_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_monitor_interval_is_never_zero() {
        let config = ServiceConfig::new(1, 10).with_monitor_interval(Duration::from_micros(500));
        assert_eq!(config.monitor_interval_ms, 1);
        assert_eq!(config.monitor_interval(), Duration::from_millis(1));

        let config = ServiceConfig {
            monitor_interval_ms: 0,
            ..ServiceConfig::new(1, 10)
        };
        assert_eq!(config.monitor_interval(), Duration::from_millis(1));
    }
}
