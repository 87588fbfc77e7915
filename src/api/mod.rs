// HTTP surface: metrics exposition, health checks and the vessel API

pub mod config;
mod exposition;
mod vessels;

pub use config::ServerConfig;

use crate::metrics::MetricsRegistry;
use crate::sim::EngineHandle;
use crate::snapshot::FleetStore;
use axum::{routing::get, Router};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Readiness check path
pub const READY_PATH: &str = "/ready";
/// Prefix of the vessel JSON API
pub const VESSELS_PATH: &str = "/api/vessels";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub registry: MetricsRegistry,
    pub store: FleetStore,
    pub engine: EngineHandle,
    /// Required bearer token for vessel admin calls. None = unrestricted.
    pub admin_token: Option<String>,
}

/// Error response
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Create the exporter router with every endpoint, request tracing and a
/// per-request timeout.
pub fn create_router(state: AppState, config: &ServerConfig) -> Router {
    Router::new()
        .route(&config.metrics_path, get(exposition::metrics))
        .route(&config.health_path, get(exposition::health))
        .route(READY_PATH, get(exposition::ready))
        .merge(vessels::routes())
        .layer(TimeoutLayer::new(Duration::from_millis(
            config.request_timeout_ms,
        )))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}
