//! Email job definition.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique job identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(String);

impl JobId {
    /// Creates a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the job ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// One email to send.
///
/// Owned by exactly one holder at a time: a queue, a worker, a retry timer
/// or the dead-letter log. Only `retries` changes after creation, and only
/// through [`EmailJob::record_failure`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailJob {
    /// Job ID, used to correlate log lines.
    pub id: JobId,

    /// Destination address.
    pub to: String,

    /// Subject line.
    pub subject: String,

    /// Message body.
    pub body: String,

    /// Failed attempts so far.
    pub retries: u32,

    /// Value of `retries` when the job was submitted.
    pub submitted_retries: u32,

    /// When the job was created.
    pub enqueued_at: DateTime<Utc>,
}

impl EmailJob {
    /// Creates a fresh job with no failed attempts.
    pub fn new(to: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: JobId::new(),
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
            retries: 0,
            submitted_retries: 0,
            enqueued_at: Utc::now(),
        }
    }

    /// Creates a job that already carries failed attempts, e.g. when
    /// replaying a dead letter.
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self.submitted_retries = retries;
        self
    }

    /// Counts one more failed attempt and returns the new total.
    pub fn record_failure(&mut self) -> u32 {
        self.retries += 1;
        self.retries
    }

    /// Returns true while the job has never failed.
    pub fn is_first_attempt(&self) -> bool {
        self.retries == self.submitted_retries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_id_generation() {
        let id1 = JobId::new();
        let id2 = JobId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_new_job_starts_without_retries() {
        let job = EmailJob::new("a@b.com", "Hi", "x");
        assert_eq!(job.retries, 0);
        assert_eq!(job.submitted_retries, 0);
        assert!(job.is_first_attempt());
    }

    #[test]
    fn test_record_failure_increments_by_one() {
        let mut job = EmailJob::new("a@b.com", "Hi", "x");
        assert_eq!(job.record_failure(), 1);
        assert_eq!(job.record_failure(), 2);
        assert_eq!(job.retries, 2);
        assert_eq!(job.submitted_retries, 0);
        assert!(!job.is_first_attempt());
    }

    #[test]
    fn test_with_retries_sets_submission_count() {
        let job = EmailJob::new("a@b.com", "Hi", "x").with_retries(2);
        assert_eq!(job.retries, 2);
        assert_eq!(job.submitted_retries, 2);
        assert!(job.is_first_attempt());
    }

    #[test]
    fn test_job_serialization() {
        let job = EmailJob::new("a@b.com", "Hello", "Body");
        let json = serde_json::to_value(&job).unwrap();
        assert_eq!(json["to"], "a@b.com");
        assert_eq!(json["retries"], 0);

        let restored: EmailJob = serde_json::from_value(json).unwrap();
        assert_eq!(restored, job);
    }
}
