use crate::error::{AppError, Result};
use crate::models::{NavigationDescription, NavigationRequest, Route};
use crate::services::navigation::{NavigationEvent, SessionView};
use crate::AppState;
use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::stream::{self, Stream};
use serde::Serialize;
use serde_json::{json, Value};
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

#[derive(Debug, Serialize)]
pub struct NavigationResponse {
    pub route: Route,
    pub description: NavigationDescription,
    /// Street geometry as GeoJSON; absent for direct-line routes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geometry: Option<geojson::Geometry>,
}

/// POST /navigation
/// Start navigating, replacing any active route
pub async fn start_navigation(
    State(state): State<Arc<AppState>>,
    Json(request): Json<NavigationRequest>,
) -> Result<Json<NavigationResponse>> {
    request.validate().map_err(AppError::InvalidRequest)?;

    tracing::info!(
        origin_lat = request.origin.lat,
        origin_lng = request.origin.lng,
        dest_lat = request.destination.lat,
        dest_lng = request.destination.lng,
        "Navigation request: ({:.4}, {:.4}) -> ({:.4}, {:.4}) '{}'",
        request.origin.lat, request.origin.lng,
        request.destination.lat, request.destination.lng, request.label
    );

    let route = state
        .session
        .start_navigation(request.origin, request.destination, &request.label)
        .await?;

    let description = state.addresses.generate_navigation_description(
        &request.origin,
        &request.label,
        &request.destination,
    );

    Ok(Json(NavigationResponse {
        geometry: route.polyline_geojson(),
        route,
        description,
    }))
}

/// GET /navigation
pub async fn get_navigation(State(state): State<Arc<AppState>>) -> Json<SessionView> {
    Json(state.session.view().await)
}

/// DELETE /navigation
/// Idempotent: stopping an idle session reports `stopped: false`
pub async fn stop_navigation(State(state): State<Arc<AppState>>) -> Json<Value> {
    let stopped = state.session.stop_navigation().await;
    Json(json!({ "stopped": stopped }))
}

/// GET /navigation/events
/// Session events as server-sent events, named after the event type
pub async fn navigation_events(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    let receiver = state.session.subscribe();

    let events = stream::unfold(receiver, |mut receiver| async move {
        loop {
            match receiver.recv().await {
                Ok(event) => match sse_event(&event) {
                    Some(sse) => return Some((Ok(sse), receiver)),
                    None => continue,
                },
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Navigation event subscriber lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}

fn sse_event(event: &NavigationEvent) -> Option<Event> {
    match Event::default().event(event.name()).json_data(event) {
        Ok(sse) => Some(sse),
        Err(e) => {
            tracing::error!("Failed to encode navigation event: {}", e);
            None
        }
    }
}
