//! HTTP error response conversion.
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`; `AppError`
//! values convert via `?` and render as a status code plus a short plain
//! body. Validation failures never take this path: they re-render the
//! listing page with the form error instead.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use photostore_core::AppError;

/// Wrapper implementing `IntoResponse` for the shared `AppError`
/// (orphan rules keep the impl out of photostore-core).
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
        }
        (status, self.0.to_string()).into_response()
    }
}
