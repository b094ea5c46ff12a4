//! Courier Jobs - In-process Email Job Engine
//!
//! Accepts email jobs, buffers them in bounded queues and delivers them on a
//! fixed pool of workers with:
//! - Non-blocking submission that rejects when the queue is full
//! - Linear retry backoff on an independent timer per failed job
//! - An append-only dead-letter log for permanent failures
//! - Prometheus metrics through an injected recorder
//! - Coordinated shutdown that waits for in-flight deliveries
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                   Courier Jobs Architecture                   │
//! ├───────────────────────────────────────────────────────────────┤
//! │                                                               │
//! │  enqueue()                                                    │
//! │     │                                                         │
//! │     ▼                                                         │
//! │  ┌──────────────┐            ┌──────────────┐                 │
//! │  │ Primary Queue│            │ Retry Queue  │◄─────────┐      │
//! │  └──────┬───────┘            └──────┬───────┘          │      │
//! │         └────────────┬──────────────┘                  │      │
//! │                      ▼                                 │      │
//! │  ┌─────────────────────────────────────────────┐       │      │
//! │  │                 Worker Pool                 │       │      │
//! │  │  ┌──────────┐ ┌──────────┐ ┌──────────┐     │       │      │
//! │  │  │ Worker 1 │ │ Worker 2 │ │ Worker N │     │       │      │
//! │  │  └──────────┘ └──────────┘ └──────────┘     │       │      │
//! │  └───────┬──────────────────────┬──────────────┘       │      │
//! │          │ success              │ failure              │      │
//! │          ▼                      ▼                      │      │
//! │   ┌────────────┐      ┌──────────────────┐  backoff    │      │
//! │   │  Metrics   │      │ Retry Scheduler  ├─────────────┘      │
//! │   └────────────┘      └────────┬─────────┘                    │
//! │                                │ exhausted / retry queue full │
//! │                                ▼                              │
//! │                       ┌──────────────────┐                    │
//! │                       │   Dead Letters   │                    │
//! │                       └──────────────────┘                    │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use courier_jobs::prelude::*;
//! use std::sync::Arc;
//!
//! let metrics = Arc::new(PrometheusMetrics::new());
//! let service = EmailService::new(
//!     ServiceConfig::new(3, 100),
//!     Arc::new(SimulatedMailer::default()),
//!     metrics.clone(),
//! );
//! service.start()?;
//!
//! service.enqueue(EmailJob::new("user@example.com", "Welcome", "Hello..."))?;
//!
//! service.shutdown().await?;
//! ```

pub mod config;
pub mod dead_letter;
pub mod error;
pub mod job;
pub mod mailer;
pub mod metrics;
pub mod monitor;
pub mod queue;
pub mod retry;
pub mod scheduler;
pub mod service;
pub mod shutdown;
pub mod worker;

pub use config::ServiceConfig;
pub use dead_letter::{DeadLetterQueue, DeadLetterReason, DeadLetterRecord};
pub use error::{JobError, JobResult};
pub use job::{EmailJob, JobId};
pub use mailer::{Mailer, SimulatedMailer};
pub use metrics::{InMemoryMetrics, JobMetrics, MetricsSnapshot, PrometheusMetrics};
pub use monitor::QueueMonitor;
pub use queue::{BoundedQueue, PushError};
pub use retry::{RetryDecision, RetryPolicy};
pub use scheduler::{RetryLoop, RetryScheduler};
pub use service::{EmailService, ServiceState, ServiceStats};
pub use shutdown::{ShutdownSignal, ShutdownTrigger};
pub use worker::Worker;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::mailer::{Mailer, SimulatedMailer};
    pub use crate::metrics::{JobMetrics, PrometheusMetrics};
    pub use crate::service::{EmailService, ServiceState};
    pub use crate::{EmailJob, JobError, JobId, JobResult, ServiceConfig};
}
