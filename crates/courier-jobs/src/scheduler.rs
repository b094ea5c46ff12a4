//! Delayed re-submission of failed jobs.
//!
//! Each failure that earns a retry gets its own timer task. The timers are
//! owned by a single [`RetryLoop`] which keeps them in a `JoinSet` and exits
//! once every [`RetryScheduler`] handle is dropped and the last timer has
//! finished. Workers are never blocked by a backoff.

use crate::dead_letter::{DeadLetterQueue, DeadLetterReason};
use crate::error::JobError;
use crate::job::EmailJob;
use crate::queue::{BoundedQueue, PushError};
use crate::retry::{RetryDecision, RetryPolicy};
use crate::shutdown::ShutdownSignal;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// Handle used by workers to report failed jobs.
#[derive(Clone)]
pub struct RetryScheduler {
    tx: mpsc::UnboundedSender<(EmailJob, Duration)>,
    policy: RetryPolicy,
    dead_letters: Arc<DeadLetterQueue>,
}

/// Owns the retry timers. Run it on its own task.
pub struct RetryLoop {
    rx: mpsc::UnboundedReceiver<(EmailJob, Duration)>,
    retry_queue: Arc<BoundedQueue<EmailJob>>,
    dead_letters: Arc<DeadLetterQueue>,
    shutdown: ShutdownSignal,
}

impl RetryScheduler {
    /// Creates a scheduler handle and the loop that serves it.
    pub fn new(
        policy: RetryPolicy,
        retry_queue: Arc<BoundedQueue<EmailJob>>,
        dead_letters: Arc<DeadLetterQueue>,
        shutdown: ShutdownSignal,
    ) -> (Self, RetryLoop) {
        let (tx, rx) = mpsc::unbounded_channel();
        let scheduler = Self {
            tx,
            policy,
            dead_letters: dead_letters.clone(),
        };
        let retry_loop = RetryLoop {
            rx,
            retry_queue,
            dead_letters,
            shutdown,
        };
        (scheduler, retry_loop)
    }

    /// Counts the failure on `job` and either schedules a retry or
    /// dead-letters it.
    pub fn handle_failure(&self, mut job: EmailJob, error: &JobError) {
        let retries = job.record_failure();

        if !error.is_retryable() {
            warn!(job_id = %job.id, error = %error, "Job failed with a non-retryable error");
            self.dead_letters.record(job, DeadLetterReason::NotRetryable);
            return;
        }

        match self.policy.decide(retries) {
            RetryDecision::Retry(delay) => {
                info!(
                    job_id = %job.id,
                    to = %job.to,
                    retries,
                    max_retries = self.policy.max_retries,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    "Job failed, scheduling retry"
                );
                if let Err(mpsc::error::SendError((job, _))) = self.tx.send((job, delay)) {
                    self.dead_letters.record(job, DeadLetterReason::Shutdown);
                }
            }
            RetryDecision::Exhausted => {
                let reason = JobError::MaxRetriesExceeded {
                    job_id: job.id.to_string(),
                    attempts: retries,
                };
                error!(to = %job.to, error = %reason, "Job permanently failed");
                self.dead_letters.record(job, DeadLetterReason::RetriesExhausted);
            }
        }
    }
}

impl RetryLoop {
    /// Spawns a timer per scheduled retry until every handle is dropped,
    /// then waits for the outstanding timers.
    pub async fn run(mut self) {
        debug!("Retry loop started");
        let mut timers = JoinSet::new();

        loop {
            tokio::select! {
                scheduled = self.rx.recv() => match scheduled {
                    Some((job, delay)) => {
                        timers.spawn(retry_after(
                            job,
                            delay,
                            self.retry_queue.clone(),
                            self.dead_letters.clone(),
                            self.shutdown.clone(),
                        ));
                    }
                    None => break,
                },
                Some(finished) = timers.join_next(), if !timers.is_empty() => {
                    log_timer_exit(finished);
                }
            }
        }

        while let Some(finished) = timers.join_next().await {
            log_timer_exit(finished);
        }
        debug!("Retry loop stopped");
    }
}

async fn retry_after(
    job: EmailJob,
    delay: Duration,
    retry_queue: Arc<BoundedQueue<EmailJob>>,
    dead_letters: Arc<DeadLetterQueue>,
    mut shutdown: ShutdownSignal,
) {
    tokio::select! {
        biased;
        _ = shutdown.recv() => {
            debug!(job_id = %job.id, "Retry abandoned by shutdown");
            dead_letters.record(job, DeadLetterReason::Shutdown);
        }
        _ = tokio::time::sleep(delay) => {
            match retry_queue.try_push(job) {
                Ok(()) => {}
                Err(PushError::Full(job)) => {
                    let reason = JobError::RetryQueueFull(job.id.to_string());
                    warn!(error = %reason, "Retry queue is full");
                    dead_letters.record(job, DeadLetterReason::RetryQueueFull);
                }
                Err(PushError::Closed(job)) => {
                    dead_letters.record(job, DeadLetterReason::Shutdown);
                }
            }
        }
    }
}

fn log_timer_exit(finished: Result<(), tokio::task::JoinError>) {
    if let Err(e) = finished {
        error!(error = %e, "Retry timer terminated abnormally");
    }
}
