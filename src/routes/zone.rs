use crate::models::{Coordinates, Landmark};
use crate::AppState;
use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct ZoneResponse {
    pub name: String,
    pub commune: String,
    pub city: String,
    pub country: String,
    pub center: Coordinates,
    /// Boundary ring as a GeoJSON Polygon (`[lng, lat]` positions)
    pub boundary: geojson::Geometry,
    pub landmarks: Vec<Landmark>,
}

/// GET /zone
pub async fn get_zone(State(state): State<Arc<AppState>>) -> Json<ZoneResponse> {
    let zone = state.zone.definition();
    let ring = zone
        .polygon
        .vertices()
        .iter()
        .map(|c| vec![c.lng, c.lat])
        .collect();

    Json(ZoneResponse {
        name: zone.name.clone(),
        commune: zone.commune.clone(),
        city: zone.city.clone(),
        country: zone.country.clone(),
        center: zone.center,
        boundary: geojson::Geometry::new(geojson::Value::Polygon(vec![ring])),
        landmarks: zone.landmarks.clone(),
    })
}
