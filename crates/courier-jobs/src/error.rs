//! Job error types.

use courier_core::CourierError;
use thiserror::Error;

/// Result type for job operations.
pub type JobResult<T> = Result<T, JobError>;

/// Job-related errors.
#[derive(Debug, Error)]
pub enum JobError {
    /// Primary queue is at capacity.
    #[error("Queue is full: {0}")]
    QueueFull(String),

    /// Queue no longer accepts jobs (service shutting down).
    #[error("Queue is closed: {0}")]
    QueueClosed(String),

    /// The delivery attempt failed and may be retried.
    #[error("Delivery failed: {0}")]
    DeliveryFailed(String),

    /// A scheduled retry could not be re-queued.
    #[error("Retry queue is full, dropping retry for job {0}")]
    RetryQueueFull(String),

    /// Retry budget exhausted.
    #[error("Max retries exceeded for job {job_id}: {attempts} attempts")]
    MaxRetriesExceeded { job_id: String, attempts: u32 },

    /// Unexpected fault (panic) while processing a job.
    #[error("Worker fault: {0}")]
    WorkerFault(String),

    /// Invalid lifecycle state.
    #[error("Invalid state: expected {expected}, got {actual}")]
    InvalidState { expected: String, actual: String },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl JobError {
    /// Returns true if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, JobError::DeliveryFailed(_) | JobError::WorkerFault(_))
    }

    /// Returns true if the error means the caller should back off and resubmit.
    pub fn is_overload(&self) -> bool {
        matches!(self, JobError::QueueFull(_) | JobError::QueueClosed(_))
    }
}

impl From<JobError> for CourierError {
    fn from(err: JobError) -> Self {
        if err.is_overload() {
            return CourierError::ServiceUnavailable(err.to_string());
        }
        match err {
            JobError::InvalidState { .. } => CourierError::InvalidState(err.to_string()),
            JobError::Configuration(msg) => CourierError::Configuration(msg),
            other => CourierError::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_retryable_delivery_failed() {
        let err = JobError::DeliveryFailed("smtp rejected".into());
        assert!(err.is_retryable());
    }

    #[test]
    fn test_is_retryable_worker_fault() {
        let err = JobError::WorkerFault("panicked".into());
        assert!(err.is_retryable());
    }

    #[test]
    fn test_is_not_retryable_queue_full() {
        let err = JobError::QueueFull("primary".into());
        assert!(!err.is_retryable());
        assert!(err.is_overload());
    }

    #[test]
    fn test_exhausted_retries_are_terminal() {
        let err = JobError::MaxRetriesExceeded {
            job_id: "abc".into(),
            attempts: 4,
        };
        assert!(!err.is_retryable());
        assert!(!err.is_overload());
    }

    #[test]
    fn test_error_display_invalid_state() {
        let err = JobError::InvalidState {
            expected: "running".into(),
            actual: "stopped".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("running") && msg.contains("stopped"));
    }

    #[test]
    fn test_overload_maps_to_service_unavailable() {
        let err: CourierError = JobError::QueueFull("primary".into()).into();
        assert_eq!(err.status_code(), 503);

        let err: CourierError = JobError::QueueClosed("primary".into()).into();
        assert_eq!(err.error_code(), "SERVICE_UNAVAILABLE");
    }

    #[test]
    fn test_invalid_state_maps_to_conflict() {
        let err: CourierError = JobError::InvalidState {
            expected: "constructed".into(),
            actual: "running".into(),
        }
        .into();
        assert_eq!(err.status_code(), 409);
    }
}
