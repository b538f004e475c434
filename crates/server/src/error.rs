//! HTTP mapping for [`AppError`].

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use medrag_core::{AppError, ErrorKind};
use serde::Serialize;

/// Error body: `{"error": "<message>"}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Wrapper that turns an [`AppError`] into a JSON error response.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl ApiError {
    /// Map error kind to HTTP status code
    pub fn status_code(&self) -> StatusCode {
        if matches!(self.0, AppError::PayloadTooLarge(_)) {
            return StatusCode::PAYLOAD_TOO_LARGE;
        }
        match self.0.kind() {
            ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            ErrorKind::ServiceUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::UpstreamUnavailable => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self.0.kind() {
            ErrorKind::InternalError => tracing::error!(error = ?self.0, "Internal error during search"),
            ErrorKind::ServiceUnavailable => tracing::warn!(error = %self.0, "Search rejected"),
            _ => tracing::debug!(error = %self.0, %status, "Request rejected"),
        }

        let body = ErrorBody {
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AppError::bad_request("x"), StatusCode::BAD_REQUEST),
            (
                AppError::ServiceUnavailable("Index not loaded on server".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (AppError::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR),
            (
                AppError::IndexLoad("bad file".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                AppError::UpstreamUnavailable("down".into()),
                StatusCode::BAD_GATEWAY,
            ),
            (
                AppError::PayloadTooLarge("too big".into()),
                StatusCode::PAYLOAD_TOO_LARGE,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError(err).status_code(), expected);
        }
    }
}
