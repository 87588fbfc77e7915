use super::{AppState, ErrorResponse};
use crate::metrics::{RegistryError, TEXT_CONTENT_TYPE};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use std::sync::Arc;
use tracing::error;

/// GET {metrics_path} - Prometheus text exposition of the latest snapshot
pub(super) async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    match state.registry.render() {
        Ok(body) => ([(header::CONTENT_TYPE, TEXT_CONTENT_TYPE)], body).into_response(),
        Err(RegistryError::NotReady) => (
            StatusCode::SERVICE_UNAVAILABLE,
            "fleet not initialized yet\n",
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Metrics exposition failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// GET {health_path} - liveness, independent of simulation state
pub(super) async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// GET /ready - 200 once the first snapshot is published
pub(super) async fn ready(State(state): State<Arc<AppState>>) -> Response {
    match state.store.load() {
        Some(snapshot) => Json(json!({
            "status": "ready",
            "tick": snapshot.tick,
        }))
        .into_response(),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "starting" })),
        )
            .into_response(),
    }
}
