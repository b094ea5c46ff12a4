//! # Courier Config
//!
//! Configuration management for Courier.
//! Supports layered configuration from files, environment variables
//! and the flat variables (`WORKERS`, `QUEUE_SIZE`, `PORT`) understood by
//! earlier deployments of the email queue.

mod app_config;
mod loader;
mod validation;

pub use app_config::*;
pub use loader::*;
pub use validation::*;
