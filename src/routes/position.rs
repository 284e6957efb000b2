use crate::error::{AppError, Result};
use crate::models::{Coordinates, Position, PositionError};
use crate::routes::address::AddressResponse;
use crate::services::positioning::ZoneTransition;
use crate::AppState;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Body of POST /position: `{"fix": {...}}` or `{"error": "timeout"}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionReportRequest {
    Fix(Position),
    Error(String),
}

#[derive(Debug, Serialize)]
pub struct PositionResponse {
    #[serde(flatten)]
    pub address: AddressResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_transition: Option<ZoneTransition>,
    /// Distance left to the installed route's destination, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_distance_m: Option<f64>,
}

/// POST /position
/// Publish a device report to live tracking and describe the new position
pub async fn report_position(
    State(state): State<Arc<AppState>>,
    Json(report): Json<PositionReportRequest>,
) -> Result<Json<PositionResponse>> {
    let position = match report {
        PositionReportRequest::Fix(position) => position,
        PositionReportRequest::Error(code) => {
            let error: PositionError = code.parse().map_err(AppError::InvalidRequest)?;
            state.positions.publish(Err(error));
            return Err(AppError::Position(error));
        }
    };
    position.validate().map_err(AppError::InvalidRequest)?;

    state.positions.publish(Ok(position));
    state.last_position.save(&position).await;

    let address = AddressResponse::build(&state, &position);
    let zone_transition = state.zone_tracker.observe(&address.located);
    // Live tracking applies the fix to the session on its own task
    let view = state.session.view().await;
    let remaining_distance_m = view
        .route
        .map(|route| position.coordinates.distance_to(&route.destination));

    Ok(Json(PositionResponse {
        address,
        zone_transition,
        remaining_distance_m,
    }))
}

/// GET /position
/// Latest reported position, or the last reported failure. Before any report
/// since startup, the last fix kept in the store.
pub async fn current_position(
    State(state): State<Arc<AppState>>,
) -> Result<Json<AddressResponse>> {
    let position = match state.positions.latest() {
        Some(report) => report?,
        None => state
            .last_position
            .load()
            .await
            .ok_or(PositionError::PositionUnavailable)?,
    };
    Ok(Json(AddressResponse::build(&state, &position)))
}

/// Optional `lat`/`lng` query pair for position-relative listings.
#[derive(Debug, Default, Deserialize)]
pub struct PositionQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl PositionQuery {
    /// The explicit pair when given, else the latest fix, else the stored
    /// last position. `None` when nothing is known.
    pub async fn resolve(&self, state: &AppState) -> Result<Option<Coordinates>> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Coordinates::new(lat, lng)
                .map(Some)
                .map_err(AppError::InvalidRequest),
            (None, None) => match state.positions.latest() {
                Some(Ok(position)) => Ok(Some(position.coordinates)),
                _ => Ok(state.last_position.load().await.map(|p| p.coordinates)),
            },
            _ => Err(AppError::InvalidRequest(
                "lat and lng must be given together".to_string(),
            )),
        }
    }

    /// Like `resolve`, but a missing position is a 503 position error.
    pub async fn require(&self, state: &AppState) -> Result<Coordinates> {
        self.resolve(state)
            .await?
            .ok_or(AppError::Position(PositionError::PositionUnavailable))
    }
}
