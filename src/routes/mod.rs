pub mod address;
pub mod alerts;
pub mod debug;
pub mod navigation;
pub mod places;
pub mod position;
pub mod zone;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/zone", get(zone::get_zone))
        .route("/address", post(address::describe_position))
        .route(
            "/position",
            get(position::current_position).post(position::report_position),
        )
        .route(
            "/navigation",
            get(navigation::get_navigation)
                .post(navigation::start_navigation)
                .delete(navigation::stop_navigation),
        )
        .route("/navigation/events", get(navigation::navigation_events))
        .route("/places", get(places::list_places))
        .route("/places/nearest", get(places::nearest_places))
        .route("/places/emergency", get(places::emergency_places))
        .route("/places/{id}", get(places::get_place))
        .route("/alerts", get(alerts::active_alerts))
        .route("/alerts/nearby", get(alerts::nearby_alerts))
        .route("/debug/health", get(debug::health_check))
        .with_state(state)
}
