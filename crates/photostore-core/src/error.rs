//! Unified application error type.
//!
//! Infrastructure crates (storage, bus, vision) define their own thiserror
//! enums and convert into `AppError` at the seam; orchestration code holds a
//! single error type.

use sqlx::Error as SqlxError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] SqlxError),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Event bus error: {0}")]
    Bus(String),

    #[error("Vision API error: {0}")]
    Vision(String),

    #[error("Image processing error: {0}")]
    ImageProcessing(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
