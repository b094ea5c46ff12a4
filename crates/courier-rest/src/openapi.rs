//! OpenAPI documentation configuration.

use crate::controllers::{
    AcceptedResponse, DeadLetterJob, DeadLetterResponse, HealthResponse, SendEmailRequest,
};
use courier_core::{ErrorResponse, FieldError};
use utoipa::OpenApi;

/// OpenAPI documentation for the email queue API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Courier Email Queue API",
        version = "1.0.0",
        description = "Asynchronous email submission with retries and a dead-letter log",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    paths(
        crate::controllers::email_controller::send_email,
        crate::controllers::email_controller::list_dead_letters,
        crate::controllers::health_controller::health_check,
        crate::controllers::health_controller::readiness_check,
        crate::controllers::health_controller::liveness_check,
        crate::controllers::metrics_controller::metrics,
    ),
    components(
        schemas(
            ErrorResponse,
            FieldError,
            SendEmailRequest,
            AcceptedResponse,
            DeadLetterJob,
            DeadLetterResponse,
            HealthResponse,
        )
    ),
    tags(
        (name = "email", description = "Email submission and dead letters"),
        (name = "health", description = "Health check endpoints"),
        (name = "metrics", description = "Prometheus metrics")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in ["/send-email", "/dead-letter", "/health", "/ready", "/live", "/metrics"] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
