//! API error type and its HTTP mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use notary::WorkflowError;

/// Errors returned by the HTTP handlers.
///
/// Every variant renders as `{"error": "<message>"}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed request (missing file field, missing query parameter).
    #[error("{0}")]
    BadRequest(String),
    /// Upload with a media type outside the allowlist.
    #[error("only image and video files are accepted")]
    UnsupportedMediaType,
    /// Upload exceeded the configured body limit.
    #[error("upload exceeds the {limit} byte limit")]
    PayloadTooLarge { limit: usize },
    /// Certification failed.
    #[error(transparent)]
    Certify(WorkflowError),
    /// Verification failed.
    #[error(transparent)]
    Verify(WorkflowError),
    /// The workflow did not finish within the request timeout.
    #[error("request timed out")]
    Timeout,
    /// The blocking worker failed (panicked or was aborted).
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Certify(WorkflowError::AlreadyCertified { .. }) => StatusCode::CONFLICT,
            ApiError::Certify(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Verify(WorkflowError::MissingCriteria) => StatusCode::BAD_REQUEST,
            ApiError::Verify(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
