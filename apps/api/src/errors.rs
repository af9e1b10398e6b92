use axum::{
    extract::{multipart::MultipartRejection, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::profile::parser::ParseError;
use crate::profile::retarget::UpdateError;
use crate::session::SessionError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Undecodable request bodies get the same error envelope as every other failure.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str) {
        let session = match self {
            AppError::Validation(_) => return (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::Session(e) => e,
        };

        match session {
            SessionError::Transition(_) => (StatusCode::CONFLICT, "INVALID_STATE"),
            SessionError::Extraction(_) => (StatusCode::UNPROCESSABLE_ENTITY, "EXTRACTION_FAILED"),
            SessionError::Parse(ParseError::EmptyInput)
            | SessionError::Update(UpdateError::Validation(_)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
            }
            SessionError::Parse(ParseError::ServiceUnavailable(_))
            | SessionError::Update(UpdateError::ServiceUnavailable(_)) => {
                (StatusCode::BAD_GATEWAY, "SERVICE_UNAVAILABLE")
            }
            SessionError::Parse(ParseError::MalformedOutput(_))
            | SessionError::Update(UpdateError::MalformedOutput(_)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "MALFORMED_OUTPUT")
            }
            SessionError::Update(UpdateError::StructuralMismatch { .. }) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "STRUCTURAL_MISMATCH")
            }
            SessionError::Update(UpdateError::ImmutableFieldViolation { .. }) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "IMMUTABLE_FIELD_VIOLATION")
            }
            SessionError::Persistence(_) => (StatusCode::INTERNAL_SERVER_ERROR, "PERSISTENCE_ERROR"),
            SessionError::Export(_) => (StatusCode::INTERNAL_SERVER_ERROR, "EXPORT_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.parts();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!("{code}: {message}");
        } else {
            tracing::warn!("{code}: {message}");
        }

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
