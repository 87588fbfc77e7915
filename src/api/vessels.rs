use super::{AppState, ErrorResponse, VESSELS_PATH};
use crate::fleet::FleetError;
use crate::sim::EngineError;
use crate::vessel::{Vessel, VesselStatus, VesselType};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

/// Query parameters for vessel listing
#[derive(Debug, Default, Deserialize)]
pub struct VesselQueryParams {
    /// Only vessels of this type
    #[serde(rename = "type")]
    pub vessel_type: Option<VesselType>,
    /// Only vessels in this status
    pub status: Option<VesselStatus>,
}

/// Fleet listing as of the latest snapshot
#[derive(Serialize)]
struct VesselListResponse<'a> {
    tick: u64,
    sim_elapsed_secs: f64,
    published_at: DateTime<Utc>,
    count: usize,
    vessels: Vec<&'a Vessel>,
}

#[derive(Serialize)]
struct DecommissionResponse {
    id: String,
    status: VesselStatus,
}

pub(super) fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(VESSELS_PATH, get(list_vessels))
        .route(&format!("{}/:id", VESSELS_PATH), get(get_vessel))
        .route(
            &format!("{}/:id/decommission", VESSELS_PATH),
            post(decommission_vessel),
        )
}

/// GET /api/vessels - List vessels
///
/// Query parameters:
/// - `type`: Filter by vessel type (e.g., ?type=tanker)
/// - `status`: Filter by status (e.g., ?status=underway)
async fn list_vessels(
    State(state): State<Arc<AppState>>,
    Query(params): Query<VesselQueryParams>,
) -> Result<Response, VesselApiError> {
    let snapshot = state.store.load().ok_or(VesselApiError::NotReady)?;

    let vessels: Vec<&Vessel> = snapshot
        .vessels
        .iter()
        .filter(|v| params.vessel_type.map_or(true, |t| v.vessel_type == t))
        .filter(|v| params.status.map_or(true, |s| v.status == s))
        .collect();

    Ok(Json(VesselListResponse {
        tick: snapshot.tick,
        sim_elapsed_secs: snapshot.sim_elapsed_secs,
        published_at: snapshot.published_at,
        count: vessels.len(),
        vessels,
    })
    .into_response())
}

/// GET /api/vessels/:id - Get one vessel
async fn get_vessel(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vessel>, VesselApiError> {
    let snapshot = state.store.load().ok_or(VesselApiError::NotReady)?;
    let vessel = snapshot.get(&id).ok_or(VesselApiError::NotFound(id))?;
    Ok(Json(vessel.clone()))
}

/// POST /api/vessels/:id/decommission - Move a vessel to the terminal state.
/// Requires the admin bearer token when one is configured.
async fn decommission_vessel(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<DecommissionResponse>), VesselApiError> {
    if !validate_admin_token(&headers, &state.admin_token) {
        return Err(VesselApiError::Unauthorized);
    }

    state.engine.decommission(&id).await?;
    info!(vessel_id = %id, "Decommission accepted");

    Ok((
        StatusCode::ACCEPTED,
        Json(DecommissionResponse {
            id,
            status: VesselStatus::Decommissioned,
        }),
    ))
}

/// Validate Authorization: Bearer <token> against the configured admin token.
fn validate_admin_token(headers: &HeaderMap, expected: &Option<String>) -> bool {
    let Some(expected_token) = expected else {
        // No admin token configured, unrestricted
        return true;
    };

    let Some(auth_header) = headers.get("Authorization") else {
        return false;
    };
    let Ok(value) = auth_header.to_str() else {
        return false;
    };
    let Some(token) = value.strip_prefix("Bearer ") else {
        return false;
    };

    token == expected_token
}

/// Vessel API error types
#[derive(Debug)]
enum VesselApiError {
    NotReady,
    NotFound(String),
    Conflict(String),
    Unauthorized,
    EngineUnavailable,
    Internal(String),
}

impl From<EngineError> for VesselApiError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::Fleet(FleetError::UnknownVessel(id)) => VesselApiError::NotFound(id),
            EngineError::Fleet(e @ FleetError::AlreadyDecommissioned(_)) => {
                VesselApiError::Conflict(e.to_string())
            }
            EngineError::Fleet(e) => VesselApiError::Internal(e.to_string()),
            EngineError::Unavailable => VesselApiError::EngineUnavailable,
        }
    }
}

impl IntoResponse for VesselApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            VesselApiError::NotReady => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Fleet not initialized yet".to_string(),
            ),
            VesselApiError::NotFound(id) => {
                (StatusCode::NOT_FOUND, format!("Vessel '{}' not found", id))
            }
            VesselApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            VesselApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            VesselApiError::EngineUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Simulation engine is not running".to_string(),
            ),
            VesselApiError::Internal(msg) => {
                error!(error = %msg, "Vessel API failure");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = Json(ErrorResponse {
            error: error_message,
        });

        (status, body).into_response()
    }
}
