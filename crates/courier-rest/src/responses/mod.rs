//! API response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use courier_core::{CourierError, ErrorResponse};
use courier_jobs::JobError;
use serde::Serialize;

/// Application error type for Axum.
#[derive(Debug)]
pub struct AppError(pub CourierError);

impl From<CourierError> for AppError {
    fn from(err: CourierError) -> Self {
        Self(err)
    }
}

impl From<JobError> for AppError {
    fn from(err: JobError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let body = Json(ErrorResponse::from_error(&self.0));

        (status, body).into_response()
    }
}

/// Result type for Axum handlers.
pub type ApiResult<T> = Result<T, AppError>;

/// Helper to create an accepted (202) response.
pub fn accepted<T: Serialize>(data: T) -> (StatusCode, Json<T>) {
    (StatusCode::ACCEPTED, Json(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_full_maps_to_503() {
        let response = AppError::from(JobError::QueueFull("primary".into())).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_validation_maps_to_422() {
        let response = AppError(CourierError::validation("to: email")).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_accepted_status() {
        let (status, _) = accepted("ok");
        assert_eq!(status, StatusCode::ACCEPTED);
    }
}
