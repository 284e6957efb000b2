// Library exports for testing and reusability

pub mod cache;
pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use error::{AppError, Result};

use cache::RouteCache;
use db::KeyValueStore;
use services::address::AddressGenerator;
use services::alerts::AlertBoard;
use services::navigation::RouteSession;
use services::places::PlaceCatalog;
use services::positioning::{LastPositionStore, PositionFeed, ZoneTracker};
use services::zone::ZoneModel;
use std::sync::Arc;

// App state for sharing across the application
pub struct AppState {
    pub zone: Arc<ZoneModel>,
    pub addresses: AddressGenerator,
    pub positions: Arc<PositionFeed>,
    pub last_position: LastPositionStore,
    pub zone_tracker: ZoneTracker,
    pub session: Arc<RouteSession>,
    pub places: PlaceCatalog,
    pub alerts: AlertBoard,
    pub store: Arc<dyn KeyValueStore>,
    pub cache: Option<Arc<dyn RouteCache>>,
}
