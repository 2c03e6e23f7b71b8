//! Process-wide request gate.
//!
//! The app runs behind an identity-aware proxy that authenticates users and
//! forwards the verified identity in a header. Requests missing the header
//! did not come through the proxy and are rejected before any route logic.

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Header set by the upstream identity-aware proxy.
pub const UPSTREAM_IDENTITY_HEADER: &str = "x-goog-authenticated-user-email";

pub async fn require_upstream_identity(request: Request, next: Next) -> Response {
    if request.headers().get(UPSTREAM_IDENTITY_HEADER).is_none() {
        tracing::warn!(
            path = %request.uri().path(),
            "Rejected request without upstream identity header"
        );
        return (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
    }
    next.run(request).await
}
