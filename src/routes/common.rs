//! Operational routes beside the facade: liveness, readiness (store ping), version.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Serialize)]
struct Probe {
    status: &'static str,
    store: &'static str,
    entities: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn ready(State(state): State<AppState>) -> (StatusCode, Json<Probe>) {
    let outcome = state.store.ping().await;
    if let Err(e) = &outcome {
        tracing::warn!(error = %e, store = state.store.kind(), "readiness check failed");
    }
    let status = if outcome.is_ok() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let probe = Probe {
        status: if outcome.is_ok() { "ok" } else { "degraded" },
        store: state.store.kind(),
        entities: state.registry.len(),
        error: outcome.err().map(|e| e.to_string()),
    };
    (status, Json(probe))
}

async fn version() -> Json<Value> {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// GET /health, GET /ready, GET /version.
pub fn common_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/version", get(version))
        .with_state(state)
}
