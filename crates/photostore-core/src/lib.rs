//! Photostore Core Library
//!
//! Domain models and shared building blocks for the photostore pipeline:
//! the photo record, the object-key scheme, the content-type table,
//! configuration, the unified error type, and the per-image pipeline
//! state machine.

pub mod config;
pub mod content_type;
pub mod error;
pub mod keys;
pub mod models;
pub mod pipeline;
pub mod telemetry;

pub use config::Config;
pub use error::AppError;
pub use models::Photo;
