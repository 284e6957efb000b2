use async_trait::async_trait;
use axum::Router;
use camayenne_nav::config::{embedded_alerts, embedded_places, embedded_zone, NavigationConfig};
use camayenne_nav::db::{KeyValueStore, MemoryKvStore};
use camayenne_nav::error::{AppError, Result};
use camayenne_nav::models::Coordinates;
use camayenne_nav::services::address::{AddressGenerator, PhrasePicker};
use camayenne_nav::services::navigation::{RouteSession, SnapshotStore};
use camayenne_nav::services::osrm::{ProviderRoute, ProviderStep, RoutingProvider};
use camayenne_nav::services::positioning::{LastPositionStore, PositionFeed, ZoneTracker};
use camayenne_nav::services::route_acquisition::RouteAcquisition;
use camayenne_nav::services::zone::ZoneModel;
use camayenne_nav::AppState;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Inside the zone, at Hôpital Donka
#[allow(dead_code)]
pub const ORIGIN: Coordinates = Coordinates { lat: 9.5376, lng: -13.6827 };
/// Inside the zone, at the university
#[allow(dead_code)]
pub const DESTINATION: Coordinates = Coordinates { lat: 9.5444, lng: -13.6764 };
/// North-east of Conakry, well outside the zone
#[allow(dead_code)]
pub const OUTSIDE: Coordinates = Coordinates { lat: 9.60, lng: -13.60 };

/// Routing provider double that counts calls and can be switched between
/// succeeding and failing.
pub struct MockProvider {
    calls: AtomicUsize,
    failing: AtomicBool,
    delays: Mutex<VecDeque<Duration>>,
}

#[allow(dead_code)]
impl MockProvider {
    pub fn succeeding() -> Arc<Self> {
        Arc::new(MockProvider {
            calls: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
            delays: Mutex::new(VecDeque::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        let provider = Self::succeeding();
        provider.set_failing(true);
        provider
    }

    /// Delay the next calls, in order, by these durations.
    pub fn with_delays(self: Arc<Self>, delays: &[Duration]) -> Arc<Self> {
        self.delays.lock().unwrap().extend(delays.iter().copied());
        self
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RoutingProvider for MockProvider {
    async fn walking_route(
        &self,
        origin: &Coordinates,
        destination: &Coordinates,
    ) -> Result<ProviderRoute> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let delay = self.delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::RoutingProvider("connection refused".to_string()));
        }
        Ok(street_route(origin, destination))
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// A plausible two-step street route between the endpoints.
pub fn street_route(origin: &Coordinates, destination: &Coordinates) -> ProviderRoute {
    let corner = Coordinates {
        lat: destination.lat,
        lng: origin.lng,
    };
    ProviderRoute {
        distance_meters: 1450.0,
        duration_seconds: 1044.0,
        geometry: vec![*origin, corner, *destination],
        steps: vec![
            ProviderStep {
                distance_meters: 756.0,
                duration_seconds: 544.0,
                street_name: "Route de Donka".to_string(),
                maneuver_type: "depart".to_string(),
                modifier: None,
            },
            ProviderStep {
                distance_meters: 694.0,
                duration_seconds: 500.0,
                street_name: "Corniche Nord".to_string(),
                maneuver_type: "turn".to_string(),
                modifier: Some("right".to_string()),
            },
            ProviderStep {
                distance_meters: 0.0,
                duration_seconds: 0.0,
                street_name: String::new(),
                maneuver_type: "arrive".to_string(),
                modifier: None,
            },
        ],
    }
}

/// Key-value store whose every operation fails, like a corrupted database file.
#[allow(dead_code)]
pub struct FailingStore;

#[async_trait]
impl KeyValueStore for FailingStore {
    async fn get(&self, _: &str) -> Result<Option<String>> {
        Err(AppError::Storage("database disk image is malformed".to_string()))
    }

    async fn set(&self, _: &str, _: &str) -> Result<()> {
        Err(AppError::Storage("database or disk is full".to_string()))
    }

    async fn remove(&self, _: &str) -> Result<()> {
        Err(AppError::Storage("database disk image is malformed".to_string()))
    }

    async fn remove_older_than(&self, _: &str, _: i64) -> Result<u64> {
        Err(AppError::Storage("database disk image is malformed".to_string()))
    }

    async fn retain_newest(&self, _: &str, _: u64) -> Result<u64> {
        Err(AppError::Storage("database disk image is malformed".to_string()))
    }

    async fn health_check(&self) -> bool {
        false
    }

    fn backend_name(&self) -> &'static str {
        "failing"
    }
}

#[allow(dead_code)]
pub fn zone() -> Arc<ZoneModel> {
    Arc::new(ZoneModel::new(embedded_zone().unwrap()))
}

#[allow(dead_code)]
pub struct TestSession {
    pub session: Arc<RouteSession>,
    pub feed: Arc<PositionFeed>,
    pub store: Arc<MemoryKvStore>,
}

#[allow(dead_code)]
pub fn test_session(provider: Arc<dyn RoutingProvider>, config: NavigationConfig) -> TestSession {
    let store = Arc::new(MemoryKvStore::new());
    test_session_with_store(provider, config, store)
}

#[allow(dead_code)]
pub fn test_session_with_store(
    provider: Arc<dyn RoutingProvider>,
    config: NavigationConfig,
    store: Arc<MemoryKvStore>,
) -> TestSession {
    let acquisition = Arc::new(RouteAcquisition::new(zone(), provider));
    let feed = Arc::new(PositionFeed::new());
    let session = RouteSession::new(
        acquisition,
        feed.clone(),
        SnapshotStore::new(store.clone()),
        config,
    );
    TestSession {
        session,
        feed,
        store,
    }
}

/// Application state wired like the binary, with a deterministic phrase picker.
#[allow(dead_code)]
pub fn test_state(provider: Arc<dyn RoutingProvider>) -> Arc<AppState> {
    test_state_with_store(provider, Arc::new(MemoryKvStore::new()))
}

#[allow(dead_code)]
pub fn test_state_with_store(
    provider: Arc<dyn RoutingProvider>,
    store: Arc<dyn KeyValueStore>,
) -> Arc<AppState> {
    let zone = zone();
    let acquisition = Arc::new(RouteAcquisition::new(zone.clone(), provider));
    let positions = Arc::new(PositionFeed::new());
    let session = RouteSession::new(
        acquisition,
        positions.clone(),
        SnapshotStore::new(store.clone()),
        NavigationConfig::default(),
    );

    Arc::new(AppState {
        addresses: AddressGenerator::with_picker(zone.clone(), PhrasePicker::Fixed(1)),
        zone,
        positions,
        last_position: LastPositionStore::new(store.clone()),
        zone_tracker: ZoneTracker::new(),
        session,
        places: embedded_places().unwrap(),
        alerts: embedded_alerts().unwrap(),
        store,
        cache: None,
    })
}

/// Serve `app` on an ephemeral local port and return its base URL.
#[allow(dead_code)]
pub async fn spawn_mock_server(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock server");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}
