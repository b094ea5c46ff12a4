//! Email submission and dead-letter controller.

use crate::extractors::ValidatedJson;
use crate::responses::{accepted, ApiResult};
use crate::state::AppState;
use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use courier_core::ErrorResponse;
use courier_jobs::{DeadLetterRecord, EmailJob};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;
use validator::Validate;

/// Create the email router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/send-email", post(send_email))
        .route("/dead-letter", get(list_dead_letters))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Email submission request.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SendEmailRequest {
    /// Destination address.
    #[validate(
        length(min = 1, message = "to is required"),
        custom(function = "courier_core::rules::email_address", message = "Invalid email format")
    )]
    #[schema(example = "user@example.com")]
    pub to: String,

    /// Subject line.
    #[validate(length(min = 1, message = "subject is required"))]
    #[schema(example = "Welcome")]
    pub subject: String,

    /// Message body.
    #[validate(length(min = 1, message = "body is required"))]
    pub body: String,
}

/// Response for an accepted submission.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AcceptedResponse {
    pub status: String,
    pub message: String,
    /// ID used in engine log lines for this job.
    pub job_id: String,
}

/// One dead-lettered job.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeadLetterJob {
    pub id: String,
    pub to: String,
    pub subject: String,
    pub body: String,
    /// Failed attempts when the job was dead-lettered.
    pub retries: u32,
    /// Why the job was dead-lettered.
    pub reason: String,
    pub dead_lettered_at: DateTime<Utc>,
}

impl From<DeadLetterRecord> for DeadLetterJob {
    fn from(record: DeadLetterRecord) -> Self {
        let DeadLetterRecord {
            job,
            reason,
            dead_lettered_at,
        } = record;
        Self {
            id: job.id.to_string(),
            to: job.to,
            subject: job.subject,
            body: job.body,
            retries: job.retries,
            reason: reason.to_string(),
            dead_lettered_at,
        }
    }
}

/// Dead-letter listing.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeadLetterResponse {
    pub count: usize,
    pub jobs: Vec<DeadLetterJob>,
}

// ============================================================================
// Handlers
// ============================================================================

/// Queue an email for delivery.
#[utoipa::path(
    post,
    path = "/send-email",
    tag = "email",
    request_body = SendEmailRequest,
    responses(
        (status = 202, description = "Email queued", body = AcceptedResponse),
        (status = 400, description = "Malformed JSON", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse),
        (status = 503, description = "Queue full or shutting down", body = ErrorResponse)
    )
)]
pub async fn send_email(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<SendEmailRequest>,
) -> ApiResult<impl IntoResponse> {
    let job = EmailJob::new(request.to, request.subject, request.body);
    let job_id = state.email_service.enqueue(job)?;

    info!(job_id = %job_id, "Email accepted");

    Ok(accepted(AcceptedResponse {
        status: "accepted".to_string(),
        message: "Email queued for processing".to_string(),
        job_id: job_id.to_string(),
    }))
}

/// List permanently failed jobs in the order they failed.
#[utoipa::path(
    get,
    path = "/dead-letter",
    tag = "email",
    responses(
        (status = 200, description = "Dead-letter log", body = DeadLetterResponse)
    )
)]
pub async fn list_dead_letters(State(state): State<AppState>) -> Json<DeadLetterResponse> {
    let jobs: Vec<DeadLetterJob> = state
        .email_service
        .dead_letters()
        .into_iter()
        .map(DeadLetterJob::from)
        .collect();

    Json(DeadLetterResponse {
        count: jobs.len(),
        jobs,
    })
}
