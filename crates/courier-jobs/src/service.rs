//! Lifecycle controller for the email engine.

use crate::config::ServiceConfig;
use crate::dead_letter::{DeadLetterQueue, DeadLetterRecord};
use crate::error::{JobError, JobResult};
use crate::job::{EmailJob, JobId};
use crate::mailer::Mailer;
use crate::metrics::JobMetrics;
use crate::monitor::QueueMonitor;
use crate::queue::{BoundedQueue, PushError};
use crate::scheduler::RetryScheduler;
use crate::shutdown::{self, ShutdownSignal, ShutdownTrigger};
use crate::worker::Worker;
use parking_lot::Mutex;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Engine lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceState {
    /// Built, nothing running yet. Jobs may already be enqueued.
    Constructed,
    /// Workers, retry loop and monitor are running.
    Running,
    /// Submissions are refused, loops are winding down.
    ShuttingDown,
    /// Every task has exited.
    Stopped,
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ServiceState::Constructed => "constructed",
            ServiceState::Running => "running",
            ServiceState::ShuttingDown => "shutting_down",
            ServiceState::Stopped => "stopped",
        };
        write!(f, "{}", s)
    }
}

/// Point-in-time view of the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceStats {
    pub state: ServiceState,
    pub workers: usize,
    pub queue_length: usize,
    pub queue_capacity: usize,
    pub retry_queue_length: usize,
    pub retry_queue_capacity: usize,
    pub dead_letters: usize,
}

/// Email job engine.
///
/// Owns both queues, the dead-letter log and every background task. Call
/// [`start`](Self::start) once inside a Tokio runtime and
/// [`shutdown`](Self::shutdown) at most once. The shutdown call is not
/// bounded here; wrap it in a timeout if needed.
pub struct EmailService {
    config: ServiceConfig,
    primary: Arc<BoundedQueue<EmailJob>>,
    retry: Arc<BoundedQueue<EmailJob>>,
    dead_letters: Arc<DeadLetterQueue>,
    mailer: Arc<dyn Mailer>,
    metrics: Arc<dyn JobMetrics>,
    state: Mutex<ServiceState>,
    trigger: ShutdownTrigger,
    signal: ShutdownSignal,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl EmailService {
    /// Creates the engine. Nothing runs until [`start`](Self::start).
    pub fn new(
        config: ServiceConfig,
        mailer: Arc<dyn Mailer>,
        metrics: Arc<dyn JobMetrics>,
    ) -> Self {
        let (trigger, signal) = shutdown::channel();

        Self {
            primary: Arc::new(BoundedQueue::new("primary", config.queue_capacity)),
            retry: Arc::new(BoundedQueue::new("retry", config.retry_capacity)),
            dead_letters: Arc::new(DeadLetterQueue::new(metrics.clone())),
            mailer,
            metrics,
            state: Mutex::new(ServiceState::Constructed),
            trigger,
            signal,
            tasks: Mutex::new(Vec::new()),
            config,
        }
    }

    /// Launches the workers, the retry loop and the queue monitor.
    pub fn start(&self) -> JobResult<()> {
        let mut state = self.state.lock();
        if *state != ServiceState::Constructed {
            return Err(JobError::InvalidState {
                expected: ServiceState::Constructed.to_string(),
                actual: state.to_string(),
            });
        }

        let (scheduler, retry_loop) = RetryScheduler::new(
            self.config.retry_policy,
            self.retry.clone(),
            self.dead_letters.clone(),
            self.signal.clone(),
        );

        let mut tasks = self.tasks.lock();
        for id in 1..=self.config.workers {
            let worker = Worker::new(
                id,
                self.primary.clone(),
                self.retry.clone(),
                self.mailer.clone(),
                scheduler.clone(),
                self.metrics.clone(),
            );
            tasks.push(tokio::spawn(worker.run(self.signal.clone())));
        }
        // The loop exits once the workers drop their scheduler handles.
        drop(scheduler);
        tasks.push(tokio::spawn(retry_loop.run()));

        let monitor = QueueMonitor::new(
            self.primary.clone(),
            self.metrics.clone(),
            self.config.monitor_interval(),
        );
        tasks.push(tokio::spawn(monitor.run(self.signal.clone())));

        *state = ServiceState::Running;
        info!(
            workers = self.config.workers,
            queue_size = self.config.queue_capacity,
            retry_queue_size = self.config.retry_capacity,
            "Email service started"
        );
        Ok(())
    }

    /// Submits a job without waiting.
    ///
    /// Fails with [`JobError::QueueFull`] when the primary queue is at
    /// capacity and [`JobError::QueueClosed`] once shutdown has begun. A
    /// rejected job is not kept anywhere.
    pub fn enqueue(&self, job: EmailJob) -> JobResult<JobId> {
        let id = job.id.clone();

        match self.primary.try_push(job) {
            Ok(()) => {
                debug!(job_id = %id, "Job enqueued");
                Ok(id)
            }
            Err(PushError::Full(_)) => Err(JobError::QueueFull(format!(
                "{} queue at capacity ({})",
                self.primary.name(),
                self.primary.capacity()
            ))),
            Err(PushError::Closed(_)) => Err(JobError::QueueClosed(
                "email service is shutting down".to_string(),
            )),
        }
    }

    /// Returns a copy of the dead-letter log in insertion order.
    pub fn dead_letters(&self) -> Vec<DeadLetterRecord> {
        self.dead_letters.list()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ServiceState {
        *self.state.lock()
    }

    /// Returns true while the engine accepts and processes jobs.
    pub fn is_running(&self) -> bool {
        self.state() == ServiceState::Running
    }

    /// Queue occupancy and lifecycle state.
    pub fn stats(&self) -> ServiceStats {
        ServiceStats {
            state: self.state(),
            workers: self.config.workers,
            queue_length: self.primary.len(),
            queue_capacity: self.primary.capacity(),
            retry_queue_length: self.retry.len(),
            retry_queue_capacity: self.retry.capacity(),
            dead_letters: self.dead_letters.len(),
        }
    }

    /// Stops accepting jobs, signals every task and waits for them to exit.
    ///
    /// Jobs being delivered are finished. Retries still waiting on their
    /// backoff are dead-lettered. Jobs left in either queue are dropped.
    pub async fn shutdown(&self) -> JobResult<()> {
        {
            let mut state = self.state.lock();
            match *state {
                ServiceState::Constructed | ServiceState::Running => {
                    *state = ServiceState::ShuttingDown;
                }
                other => {
                    return Err(JobError::InvalidState {
                        expected: ServiceState::Running.to_string(),
                        actual: other.to_string(),
                    });
                }
            }
        }
        info!("Shutting down email service");

        self.primary.close();
        self.retry.close();
        self.trigger.trigger();

        let tasks = std::mem::take(&mut *self.tasks.lock());
        for task in tasks {
            if let Err(e) = task.await {
                error!(error = %e, "Engine task terminated abnormally");
            }
        }

        let abandoned = self.primary.drain().len() + self.retry.drain().len();
        if abandoned > 0 {
            warn!(abandoned, "Jobs left in queues were dropped at shutdown");
        }
        self.metrics.set_queue_length(0);

        *self.state.lock() = ServiceState::Stopped;
        info!(
            dead_letters = self.dead_letters.len(),
            "Email service shutdown complete"
        );
        Ok(())
    }
}

impl Drop for EmailService {
    fn drop(&mut self) {
        if !self.trigger.is_triggered() {
            self.primary.close();
            self.retry.close();
            self.trigger.trigger();
        }
    }
}

impl fmt::Debug for EmailService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmailService")
            .field("config", &self.config)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
