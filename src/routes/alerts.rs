use crate::error::Result;
use crate::models::{Alert, NearbyAlert};
use crate::routes::position::PositionQuery;
use crate::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use time::OffsetDateTime;

#[derive(Debug, Serialize)]
pub struct AlertsResponse<T> {
    pub count: usize,
    pub alerts: Vec<T>,
}

impl<T> From<Vec<T>> for AlertsResponse<T> {
    fn from(alerts: Vec<T>) -> Self {
        AlertsResponse {
            count: alerts.len(),
            alerts,
        }
    }
}

/// GET /alerts
/// Alerts active now, highest priority first
pub async fn active_alerts(State(state): State<Arc<AppState>>) -> Json<AlertsResponse<Alert>> {
    Json(state.alerts.active_at(OffsetDateTime::now_utc()).into())
}

/// GET /alerts/nearby?lat=..&lng=..
/// Active alerts whose area contains the position
pub async fn nearby_alerts(
    State(state): State<Arc<AppState>>,
    Query(position): Query<PositionQuery>,
) -> Result<Json<AlertsResponse<NearbyAlert>>> {
    let from = position.require(&state).await?;
    let nearby = state.alerts.nearby(&from, OffsetDateTime::now_utc());
    if !nearby.is_empty() {
        tracing::debug!(count = nearby.len(), "Alerts near ({:.5}, {:.5})", from.lat, from.lng);
    }
    Ok(Json(nearby.into()))
}
