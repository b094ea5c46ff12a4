//! In-memory dead-letter log.

use crate::job::EmailJob;
use crate::metrics::JobMetrics;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// Why a job was dead-lettered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeadLetterReason {
    /// Retry budget used up.
    RetriesExhausted,
    /// The retry queue had no room when the backoff elapsed.
    RetryQueueFull,
    /// The engine shut down while the job was waiting to be retried.
    Shutdown,
    /// The mailer reported an error that is not worth retrying.
    NotRetryable,
}

impl fmt::Display for DeadLetterReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DeadLetterReason::RetriesExhausted => "retries_exhausted",
            DeadLetterReason::RetryQueueFull => "retry_queue_full",
            DeadLetterReason::Shutdown => "shutdown",
            DeadLetterReason::NotRetryable => "not_retryable",
        };
        write!(f, "{}", s)
    }
}

/// A job snapshot taken when it failed permanently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeadLetterRecord {
    /// The job as it was when dead-lettered.
    pub job: EmailJob,
    /// Why it was dead-lettered.
    pub reason: DeadLetterReason,
    /// When it was dead-lettered.
    pub dead_lettered_at: DateTime<Utc>,
}

/// Append-only log of permanently failed jobs.
///
/// The append and both counter increments happen under one lock, so a
/// reader never sees a record the counters do not account for.
pub struct DeadLetterQueue {
    records: Mutex<Vec<DeadLetterRecord>>,
    metrics: Arc<dyn JobMetrics>,
}

impl DeadLetterQueue {
    /// Creates an empty log reporting to `metrics`.
    pub fn new(metrics: Arc<dyn JobMetrics>) -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            metrics,
        }
    }

    /// Appends a job and counts it as failed and dead-lettered.
    pub fn record(&self, job: EmailJob, reason: DeadLetterReason) {
        let mut records = self.records.lock();

        warn!(
            job_id = %job.id,
            to = %job.to,
            retries = job.retries,
            reason = %reason,
            "Job moved to dead letter queue"
        );

        records.push(DeadLetterRecord {
            job,
            reason,
            dead_lettered_at: Utc::now(),
        });
        self.metrics.job_failed();
        self.metrics.job_dead_lettered();
    }

    /// Returns a copy of every record in insertion order.
    pub fn list(&self) -> Vec<DeadLetterRecord> {
        self.records.lock().clone()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Returns true if nothing has been dead-lettered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for DeadLetterQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeadLetterQueue")
            .field("len", &self.len())
            .finish()
    }
}
