//! MedRAG Core Library
//!
//! This crate provides the foundational utilities shared by the retrieval backend:
//! - Error handling (`AppError`, `AppResult`, `ErrorKind`)
//! - Logging infrastructure
//! - Configuration management
//! - Shared types (`DocumentId`)

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{AppError, AppResult, ErrorKind};
pub use types::DocumentId;
