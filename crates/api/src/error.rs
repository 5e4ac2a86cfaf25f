//! HTTP error mapping.
//!
//! Every handler returns `Result<_, ApiError>`; the body is always
//! `{"error": "<message>"}` with 400 for caller mistakes (413 for oversized
//! uploads) and 500 otherwise.

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use risk::RiskError;
use scoring::ScoringError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed body or missing field (400)
    #[error("{0}")]
    BadRequest(String),

    /// Upload larger than the configured body limit (413)
    #[error("{0}")]
    PayloadTooLarge(String),

    /// Text below the scoring threshold (400)
    #[error("{0}")]
    InsufficientText(String),

    /// LLM call failed or timed out (500)
    #[error("LLM provider error: {0}")]
    Upstream(String),

    /// LLM answered with something that is not the expected JSON (500)
    #[error("Unparsable LLM response: {0}")]
    UnparsableResponse(String),

    /// Macro indicator store unavailable (500)
    #[error("Macro data source error: {0}")]
    DataSource(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::InsufficientText(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Upstream(_)
            | ApiError::UnparsableResponse(_)
            | ApiError::DataSource(_)
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        tracing::error!(status = status.as_u16(), error = %self, "Request failed");

        (status, Json(ErrorResponse { error: self.to_string() })).into_response()
    }
}

impl From<ScoringError> for ApiError {
    fn from(err: ScoringError) -> Self {
        if let Some(raw) = err.raw_response() {
            tracing::debug!(raw = %raw, "Unparsable LLM content");
        }

        let message = err.to_string();
        match err {
            ScoringError::InsufficientText { .. } => ApiError::InsufficientText(message),
            ScoringError::Upstream(message) => ApiError::Upstream(message),
            ScoringError::InvalidScores(message) => ApiError::BadRequest(message),
            ScoringError::UnparsableResponse { reason, .. } => ApiError::UnparsableResponse(reason),
        }
    }
}

impl From<RiskError> for ApiError {
    fn from(err: RiskError) -> Self {
        match err {
            RiskError::DataSource(message) => ApiError::DataSource(message),
            RiskError::Upstream(message) => ApiError::Upstream(message),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        let message = format!("Invalid multipart upload: {}", err);
        match err.status() {
            StatusCode::PAYLOAD_TOO_LARGE => ApiError::PayloadTooLarge(message),
            _ => ApiError::BadRequest(message),
        }
    }
}
