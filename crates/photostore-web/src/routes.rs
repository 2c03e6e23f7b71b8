//! Router assembly.

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::auth::require_upstream_identity;
use crate::handlers;
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/photos", get(handlers::photos))
        .route("/post", post(handlers::post_photo))
        .route("/delete", post(handlers::delete_photo))
        .layer(middleware::from_fn(require_upstream_identity))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
