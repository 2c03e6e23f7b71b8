//! Photostore Web Library
//!
//! HTTP surface of the pipeline: landing page, photo listing, multipart
//! upload (store blob, insert record, publish event, strictly in that
//! order), and best-effort deletion. Every request must carry the
//! upstream-auth identity header.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod html;
pub mod routes;
pub mod state;

pub use routes::router;
pub use state::AppState;
