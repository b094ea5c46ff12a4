//! Worker loop.

use crate::error::{JobError, JobResult};
use crate::job::EmailJob;
use crate::mailer::Mailer;
use crate::metrics::JobMetrics;
use crate::queue::BoundedQueue;
use crate::scheduler::RetryScheduler;
use crate::shutdown::ShutdownSignal;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One of the N concurrent executors.
///
/// Takes jobs from either queue until shutdown. A failing or panicking
/// delivery is handed to the retry scheduler and never ends the loop.
pub struct Worker {
    id: usize,
    primary: Arc<BoundedQueue<EmailJob>>,
    retry: Arc<BoundedQueue<EmailJob>>,
    mailer: Arc<dyn Mailer>,
    scheduler: RetryScheduler,
    metrics: Arc<dyn JobMetrics>,
}

impl Worker {
    /// Creates a worker.
    pub fn new(
        id: usize,
        primary: Arc<BoundedQueue<EmailJob>>,
        retry: Arc<BoundedQueue<EmailJob>>,
        mailer: Arc<dyn Mailer>,
        scheduler: RetryScheduler,
        metrics: Arc<dyn JobMetrics>,
    ) -> Self {
        Self {
            id,
            primary,
            retry,
            mailer,
            scheduler,
            metrics,
        }
    }

    /// Worker ID, starting at 1.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Processes jobs until the shutdown signal is raised.
    ///
    /// Ready jobs are taken from the two queues in turn, so neither queue
    /// can starve the other. A job already taken is finished before the
    /// worker exits.
    pub async fn run(self, mut shutdown: ShutdownSignal) {
        info!(worker_id = self.id, "Worker started");

        let mut retry_first = false;
        loop {
            if shutdown.is_triggered() {
                break;
            }

            let job = match self.take_ready(retry_first) {
                Some(job) => job,
                None => tokio::select! {
                    _ = shutdown.recv() => break,
                    Some(job) = self.primary.pop() => job,
                    Some(job) = self.retry.pop() => job,
                    else => break,
                },
            };
            retry_first = !retry_first;
            self.process(job).await;
        }

        info!(worker_id = self.id, "Worker shutting down");
    }

    fn take_ready(&self, retry_first: bool) -> Option<EmailJob> {
        let (first, second) = if retry_first {
            (&self.retry, &self.primary)
        } else {
            (&self.primary, &self.retry)
        };
        first.try_pop().or_else(|| second.try_pop())
    }

    async fn process(&self, job: EmailJob) {
        debug!(
            worker_id = self.id,
            job_id = %job.id,
            to = %job.to,
            subject = %job.subject,
            retries = job.retries,
            "Processing email"
        );

        match self.deliver(&job).await {
            Ok(()) => {
                info!(worker_id = self.id, job_id = %job.id, to = %job.to, "Email sent");
                self.metrics.job_processed();
            }
            Err(e) => {
                warn!(worker_id = self.id, job_id = %job.id, error = %e, "Delivery attempt failed");
                self.scheduler.handle_failure(job, &e);
            }
        }
    }

    /// Runs the mailer, turning a panic into [`JobError::WorkerFault`].
    async fn deliver(&self, job: &EmailJob) -> JobResult<()> {
        match AssertUnwindSafe(self.mailer.send(job)).catch_unwind().await {
            Ok(result) => result,
            Err(panic) => Err(JobError::WorkerFault(panic_message(panic.as_ref()))),
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
