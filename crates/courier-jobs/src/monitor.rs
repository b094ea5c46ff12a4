//! Queue depth sampler.

use crate::job::EmailJob;
use crate::metrics::JobMetrics;
use crate::queue::BoundedQueue;
use crate::shutdown::ShutdownSignal;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::debug;

const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Periodically copies the primary queue depth into the gauge.
pub struct QueueMonitor {
    queue: Arc<BoundedQueue<EmailJob>>,
    metrics: Arc<dyn JobMetrics>,
    interval: Duration,
}

impl QueueMonitor {
    /// Creates a sampler for `queue`. A zero interval is raised to one
    /// millisecond.
    pub fn new(
        queue: Arc<BoundedQueue<EmailJob>>,
        metrics: Arc<dyn JobMetrics>,
        interval: Duration,
    ) -> Self {
        Self {
            queue,
            metrics,
            interval: interval.max(MIN_INTERVAL),
        }
    }

    /// Samples until shutdown.
    pub async fn run(self, mut shutdown: ShutdownSignal) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    debug!("Queue monitor stopping");
                    return;
                }
                _ = ticker.tick() => {
                    self.metrics.set_queue_length(self.queue.len());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::InMemoryMetrics;
    use crate::shutdown;

    #[tokio::test(start_paused = true)]
    async fn test_samples_queue_depth_until_shutdown() {
        let queue = Arc::new(BoundedQueue::new("primary", 5));
        let metrics = Arc::new(InMemoryMetrics::new());
        let (trigger, signal) = shutdown::channel();

        let monitor = QueueMonitor::new(queue.clone(), metrics.clone(), Duration::from_secs(1));
        let handle = tokio::spawn(monitor.run(signal));

        queue.try_push(EmailJob::new("a@b.com", "x", "y")).unwrap();
        queue.try_push(EmailJob::new("a@b.com", "x", "y")).unwrap();
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(metrics.snapshot().queue_length, 2);

        trigger.trigger();
        handle.await.unwrap();

        queue.try_push(EmailJob::new("a@b.com", "x", "y")).unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(metrics.snapshot().queue_length, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_still_samples() {
        let queue = Arc::new(BoundedQueue::new("primary", 5));
        let metrics = Arc::new(InMemoryMetrics::new());
        let (trigger, signal) = shutdown::channel();

        let monitor = QueueMonitor::new(queue.clone(), metrics.clone(), Duration::ZERO);
        let handle = tokio::spawn(monitor.run(signal));

        queue.try_push(EmailJob::new("a@b.com", "x", "y")).unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(metrics.snapshot().queue_length, 1);

        trigger.trigger();
        handle.await.unwrap();
    }
}
