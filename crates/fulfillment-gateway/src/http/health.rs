use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::atomic::Ordering;
use std::sync::Arc;

use crate::app::AppState;

/// GET /health: liveness probe with a little server metadata.
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "path": state.config.gateway.path,
        "requests_served": state.requests_served.load(Ordering::Relaxed),
    }))
}
