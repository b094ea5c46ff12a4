//! Application state for Axum handlers.

use courier_jobs::{EmailService, PrometheusMetrics};
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub email_service: Arc<EmailService>,
    pub metrics: Arc<PrometheusMetrics>,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(email_service: Arc<EmailService>, metrics: Arc<PrometheusMetrics>) -> Self {
        Self {
            email_service,
            metrics,
        }
    }
}
