//! The facade route: `/api/` (and `/api`) accepts any verb.
//! Oversized bodies fail inside the extractor and come back as a 413 envelope.

use crate::handlers::dispatch;
use crate::state::AppState;
use axum::{extract::DefaultBodyLimit, routing::any, Router};
use tower_http::trace::TraceLayer;

pub fn api_routes(state: AppState) -> Router {
    let limit = state.settings.body_limit;
    Router::new()
        .route("/api/", any(dispatch))
        .route("/api", any(dispatch))
        .layer(DefaultBodyLimit::max(limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
