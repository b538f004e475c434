//! Error types for the MedRAG retrieval backend.
//!
//! This module defines a unified error enum covering configuration, I/O,
//! index loading, request validation, and upstream failures, plus the closed
//! [`ErrorKind`] classification that network boundaries map to status codes.

use thiserror::Error;

/// Unified error type for the retrieval backend.
///
/// All fallible functions return `Result<T, AppError>`.
/// Request-facing variants render their message verbatim so it can be
/// returned to callers as-is.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Vector index or identifier table could not be loaded
    #[error("Index load error: {0}")]
    IndexLoad(String),

    /// Malformed or missing request fields, parse failures, dimension mismatch
    #[error("{0}")]
    BadRequest(String),

    /// Request body exceeds the accepted size
    #[error("{0}")]
    PayloadTooLarge(String),

    /// A required resource failed to load at startup
    #[error("{0}")]
    ServiceUnavailable(String),

    /// Lexical engine or another remote collaborator is unreachable
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Unanticipated failures during request handling
    #[error("{0}")]
    Internal(String),
}

/// Closed classification of [`AppError`] used at request boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BadRequest,
    ServiceUnavailable,
    InternalError,
    UpstreamUnavailable,
}

impl AppError {
    /// Classify this error.
    ///
    /// Configuration, I/O, load and serialization failures that escape to a
    /// request boundary are internal errors from the caller's point of view.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::BadRequest(_) | AppError::PayloadTooLarge(_) => ErrorKind::BadRequest,
            AppError::ServiceUnavailable(_) => ErrorKind::ServiceUnavailable,
            AppError::UpstreamUnavailable(_) => ErrorKind::UpstreamUnavailable,
            AppError::Config(_)
            | AppError::Io(_)
            | AppError::IndexLoad(_)
            | AppError::Serialization(_)
            | AppError::Internal(_) => ErrorKind::InternalError,
        }
    }

    /// Create a bad request error
    pub fn bad_request(msg: impl Into<String>) -> Self {
        AppError::BadRequest(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::IndexLoad(format!("CSV error: {}", err))
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
