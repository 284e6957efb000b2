use crate::constants::DEFAULT_NEAREST_PLACES_LIMIT;
use crate::error::{AppError, Result};
use crate::models::{Coordinates, PlaceMatch};
use crate::routes::position::PositionQuery;
use crate::services::places::PlaceFilter;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct PlacesResponse {
    pub count: usize,
    /// Position distances were measured from, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Coordinates>,
    pub places: Vec<PlaceMatch>,
}

impl PlacesResponse {
    fn new(places: Vec<PlaceMatch>, from: Option<Coordinates>) -> Self {
        PlacesResponse {
            count: places.len(),
            from,
            places,
        }
    }
}

/// GET /places?category=health&q=donka&lat=..&lng=..&limit=..
/// Filtered listing, nearest first when a position is known
pub async fn list_places(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<PlaceFilter>,
    Query(position): Query<PositionQuery>,
    Query(limit): Query<LimitQuery>,
) -> Result<Json<PlacesResponse>> {
    let from = position.resolve(&state).await?;
    let mut places = state.places.search(&filter, from.as_ref());
    if let Some(limit) = limit.limit {
        places.truncate(limit);
    }

    tracing::debug!(
        category = ?filter.category,
        query = filter.q.as_deref().unwrap_or(""),
        results = places.len(),
        "Place search"
    );
    Ok(Json(PlacesResponse::new(places, from)))
}

/// GET /places/nearest?limit=5
pub async fn nearest_places(
    State(state): State<Arc<AppState>>,
    Query(position): Query<PositionQuery>,
    Query(limit): Query<LimitQuery>,
) -> Result<Json<PlacesResponse>> {
    let from = position.require(&state).await?;
    let limit = limit.limit.unwrap_or(DEFAULT_NEAREST_PLACES_LIMIT);
    let places = state.places.nearest(&from, limit);
    Ok(Json(PlacesResponse::new(places, Some(from))))
}

/// GET /places/emergency
/// Health and security places, nearest first when a position is known
pub async fn emergency_places(
    State(state): State<Arc<AppState>>,
    Query(position): Query<PositionQuery>,
) -> Result<Json<PlacesResponse>> {
    let from = position.resolve(&state).await?;
    let places = state.places.emergency(from.as_ref());
    Ok(Json(PlacesResponse::new(places, from)))
}

/// GET /places/{id}
pub async fn get_place(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(position): Query<PositionQuery>,
) -> Result<Json<PlaceMatch>> {
    let from = position.resolve(&state).await?;
    state
        .places
        .describe(&id, from.as_ref())
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("No place with id '{}'", id)))
}
