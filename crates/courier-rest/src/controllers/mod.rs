//! REST API controllers.

pub mod email_controller;
pub mod health_controller;
pub mod metrics_controller;

pub use email_controller::{AcceptedResponse, DeadLetterJob, DeadLetterResponse, SendEmailRequest};
pub use health_controller::HealthResponse;
