//! Delivery backends.

use crate::error::{JobError, JobResult};
use crate::job::EmailJob;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Sends one email.
///
/// Returning [`JobError::DeliveryFailed`] sends the job down the retry path.
/// Any other error dead-letters it straight away.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Attempts delivery of `job`.
    async fn send(&self, job: &EmailJob) -> JobResult<()>;
}

/// Stand-in for an SMTP client.
///
/// Sleeps for a fixed latency, then fails any job that had no failed
/// attempts at submission and whose subject is longer than 10 bytes and
/// ends with `!`. Everything else succeeds.
#[derive(Debug, Clone)]
pub struct SimulatedMailer {
    latency: Duration,
}

impl SimulatedMailer {
    /// Creates a mailer with the given delivery latency.
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }

    /// Returns true if `job` is rejected by the simulated server.
    pub fn should_fail(job: &EmailJob) -> bool {
        job.submitted_retries == 0 && job.subject.len() > 10 && job.subject.ends_with('!')
    }
}

impl Default for SimulatedMailer {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

#[async_trait]
impl Mailer for SimulatedMailer {
    async fn send(&self, job: &EmailJob) -> JobResult<()> {
        tokio::time::sleep(self.latency).await;

        if Self::should_fail(job) {
            return Err(JobError::DeliveryFailed(format!(
                "simulated rejection for {}",
                job.to
            )));
        }

        debug!(job_id = %job.id, to = %job.to, "Simulated delivery accepted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_subject_succeeds() {
        let job = EmailJob::new("a@b.com", "Hi!", "x");
        assert!(!SimulatedMailer::should_fail(&job));
    }

    #[test]
    fn test_long_subject_without_bang_succeeds() {
        let job = EmailJob::new("a@b.com", "This will not fail", "x");
        assert!(!SimulatedMailer::should_fail(&job));
    }

    #[test]
    fn test_eleven_bytes_with_bang_fails() {
        let job = EmailJob::new("a@b.com", "0123456789!", "x");
        assert!(SimulatedMailer::should_fail(&job));

        let job = EmailJob::new("a@b.com", "012345678!", "x");
        assert!(!SimulatedMailer::should_fail(&job));
    }

    #[test]
    fn test_failure_rule_holds_across_retries() {
        let mut job = EmailJob::new("a@b.com", "This will fail!", "x");
        job.record_failure();
        job.record_failure();
        assert!(SimulatedMailer::should_fail(&job));
    }

    #[test]
    fn test_job_submitted_with_retries_succeeds() {
        let job = EmailJob::new("a@b.com", "This will fail!", "x").with_retries(1);
        assert!(!SimulatedMailer::should_fail(&job));
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_waits_for_latency() {
        let mailer = SimulatedMailer::new(Duration::from_secs(1));
        let start = tokio::time::Instant::now();

        mailer.send(&EmailJob::new("a@b.com", "Hi", "x")).await.unwrap();
        assert!(start.elapsed() >= Duration::from_secs(1));

        let err = mailer
            .send(&EmailJob::new("a@b.com", "This will fail!", "x"))
            .await
            .unwrap_err();
        assert!(err.is_retryable());
    }
}
