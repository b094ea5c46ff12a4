//! Job engine metrics.
//!
//! The engine talks to a [`JobMetrics`] implementation handed to it at
//! construction. [`PrometheusMetrics`] backs the `/metrics` endpoint with its
//! own recorder, so nothing is installed globally and several services can
//! coexist in one process. [`InMemoryMetrics`] is the fake used in tests.

use metrics::{counter, describe_counter, describe_gauge, gauge, Counter, Gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Metric names.
pub mod names {
    /// Current number of jobs in the primary queue.
    pub const QUEUE_LENGTH: &str = "email_queue_length";
    /// Jobs delivered successfully.
    pub const JOBS_PROCESSED_TOTAL: &str = "email_jobs_processed_total";
    /// Jobs that failed permanently.
    pub const JOBS_FAILED_TOTAL: &str = "email_jobs_failed_total";
    /// Jobs moved to the dead-letter queue.
    pub const DEAD_LETTER_JOBS_TOTAL: &str = "email_dead_letter_jobs_total";
}

/// Sink for engine metrics. Every method must be safe to call from any task.
pub trait JobMetrics: Send + Sync {
    /// Sets the primary queue depth gauge.
    fn set_queue_length(&self, len: usize);

    /// Counts one successful delivery.
    fn job_processed(&self);

    /// Counts one permanent failure.
    fn job_failed(&self);

    /// Counts one dead-lettered job.
    fn job_dead_lettered(&self);
}

/// Prometheus-backed metrics with an explicitly owned recorder.
pub struct PrometheusMetrics {
    handle: PrometheusHandle,
    queue_length: Gauge,
    processed: Counter,
    failed: Counter,
    dead_lettered: Counter,
}

impl PrometheusMetrics {
    /// Builds a recorder and registers the four email metrics on it.
    pub fn new() -> Self {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        let (queue_length, processed, failed, dead_lettered) =
            metrics::with_local_recorder(&recorder, || {
                describe_gauge!(
                    names::QUEUE_LENGTH,
                    "Current number of jobs in the email queue"
                );
                describe_counter!(
                    names::JOBS_PROCESSED_TOTAL,
                    "Total number of email jobs processed"
                );
                describe_counter!(
                    names::JOBS_FAILED_TOTAL,
                    "Total number of email jobs that failed permanently"
                );
                describe_counter!(
                    names::DEAD_LETTER_JOBS_TOTAL,
                    "Total number of jobs moved to dead letter queue"
                );

                (
                    gauge!(names::QUEUE_LENGTH),
                    counter!(names::JOBS_PROCESSED_TOTAL),
                    counter!(names::JOBS_FAILED_TOTAL),
                    counter!(names::DEAD_LETTER_JOBS_TOTAL),
                )
            });

        Self {
            handle,
            queue_length,
            processed,
            failed,
            dead_lettered,
        }
    }

    /// Render metrics in Prometheus text format.
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

impl Default for PrometheusMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PrometheusMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrometheusMetrics").finish_non_exhaustive()
    }
}

impl JobMetrics for PrometheusMetrics {
    fn set_queue_length(&self, len: usize) {
        self.queue_length.set(len as f64);
    }

    fn job_processed(&self) {
        self.processed.increment(1);
    }

    fn job_failed(&self) {
        self.failed.increment(1);
    }

    fn job_dead_lettered(&self) {
        self.dead_lettered.increment(1);
    }
}

/// Point-in-time copy of [`InMemoryMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    /// Last sampled primary queue depth.
    pub queue_length: u64,
    /// Successful deliveries.
    pub processed: u64,
    /// Permanent failures.
    pub failed: u64,
    /// Dead-lettered jobs.
    pub dead_lettered: u64,
}

impl MetricsSnapshot {
    /// Jobs that have left the engine, delivered or dead-lettered.
    pub fn completed(&self) -> u64 {
        self.processed + self.failed
    }
}

/// Atomic counters, for tests and embedding without Prometheus.
#[derive(Debug, Default)]
pub struct InMemoryMetrics {
    queue_length: AtomicU64,
    processed: AtomicU64,
    failed: AtomicU64,
    dead_lettered: AtomicU64,
}

impl InMemoryMetrics {
    /// Creates zeroed metrics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads every value.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            queue_length: self.queue_length.load(Ordering::Relaxed),
            processed: self.processed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            dead_lettered: self.dead_lettered.load(Ordering::Relaxed),
        }
    }
}

impl JobMetrics for InMemoryMetrics {
    fn set_queue_length(&self, len: usize) {
        self.queue_length.store(len as u64, Ordering::Relaxed);
    }

    fn job_processed(&self) {
        self.processed.fetch_add(1, Ordering::Relaxed);
    }

    fn job_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    fn job_dead_lettered(&self) {
        self.dead_lettered.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prometheus_render_lists_all_metrics() {
        let metrics = PrometheusMetrics::new();
        metrics.set_queue_length(7);
        metrics.job_processed();
        metrics.job_processed();
        metrics.job_failed();
        metrics.job_dead_lettered();

        let text = metrics.render();
        assert!(text.contains("email_queue_length 7"));
        assert!(text.contains("email_jobs_processed_total 2"));
        assert!(text.contains("email_jobs_failed_total 1"));
        assert!(text.contains("email_dead_letter_jobs_total 1"));
    }

    #[test]
    fn test_prometheus_instances_are_independent() {
        let first = PrometheusMetrics::new();
        let second = PrometheusMetrics::new();
        first.job_processed();

        assert!(first.render().contains("email_jobs_processed_total 1"));
        assert!(!second.render().contains("email_jobs_processed_total 1"));
    }

    #[test]
    fn test_prometheus_render_includes_help() {
        let metrics = PrometheusMetrics::new();
        metrics.job_processed();
        assert!(metrics
            .render()
            .contains("# HELP email_jobs_processed_total Total number of email jobs processed"));
    }

    #[test]
    fn test_in_memory_snapshot() {
        let metrics = InMemoryMetrics::new();
        metrics.set_queue_length(3);
        metrics.job_processed();
        metrics.job_failed();
        metrics.job_dead_lettered();

        let snapshot = metrics.snapshot();
        assert_eq!(
            snapshot,
            MetricsSnapshot {
                queue_length: 3,
                processed: 1,
                failed: 1,
                dead_lettered: 1,
            }
        );
        assert_eq!(snapshot.completed(), 2);
    }
}
