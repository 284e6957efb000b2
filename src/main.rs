use axum::Router;
use camayenne_nav::cache::{MemoryRouteCache, RouteCache, StoredRouteCache};
use camayenne_nav::config::Config;
use camayenne_nav::db::{KeyValueStore, MemoryKvStore, SqliteKvStore};
use camayenne_nav::services::address::AddressGenerator;
use camayenne_nav::services::navigation::{RestoreOutcome, RouteSession, SnapshotStore};
use camayenne_nav::services::osrm::OsrmClient;
use camayenne_nav::services::positioning::{LastPositionStore, PositionFeed, ZoneTracker};
use camayenne_nav::services::route_acquisition::RouteAcquisition;
use camayenne_nav::services::zone::ZoneModel;
use camayenne_nav::AppState;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "camayenne_nav=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| format!("Failed to load configuration: {}", e))?;

    tracing::info!("Starting Camayenne navigation server");

    let zone = Arc::new(ZoneModel::new(
        config
            .load_zone()
            .map_err(|e| format!("Failed to load zone: {}", e))?,
    ));

    let places = config
        .load_places()
        .map_err(|e| format!("Failed to load places: {}", e))?;
    let alerts = config
        .load_alerts()
        .map_err(|e| format!("Failed to load alerts: {}", e))?;

    // Key-value store: try SQLite, fall back to in-memory
    let store: Arc<dyn KeyValueStore> = match open_sqlite_store(&config.store_path).await {
        Ok(store) => {
            tracing::info!("Key-value store opened: {}", config.store_path);
            Arc::new(store)
        }
        Err(e) => {
            tracing::warn!(
                "Failed to open store {}: {}. Falling back to in-memory store; navigation will not survive restarts.",
                config.store_path,
                e
            );
            Arc::new(MemoryKvStore::new())
        }
    };

    // Route cache: persisted when the store is durable, otherwise in-memory
    let cache: Arc<dyn RouteCache> = if store.backend_name() == "sqlite" {
        let stored = StoredRouteCache::new(
            store.clone(),
            config.route_cache_ttl,
            config.route_cache_max_entries,
        );
        let purged = stored.purge().await;
        if purged > 0 {
            tracing::info!("Purged {} stale cached routes", purged);
        }
        Arc::new(stored)
    } else {
        Arc::new(MemoryRouteCache::new(
            config.route_cache_ttl,
            config.route_cache_max_entries,
        ))
    };
    tracing::info!("Route cache backend: {}", cache.backend_name());

    // Initialize services
    let provider = OsrmClient::new(
        config.routing_base_url.clone(),
        config.routing_profile.clone(),
        Duration::from_secs(config.routing_timeout_secs),
    )?;
    let acquisition = RouteAcquisition::new(zone.clone(), Arc::new(provider))
        .with_cache(cache.clone())
        .with_walking_speed(config.navigation.walking_speed_m_per_min);
    let positions = Arc::new(PositionFeed::new());
    let session = RouteSession::new(
        Arc::new(acquisition),
        positions.clone(),
        SnapshotStore::new(store.clone()),
        config.navigation.clone(),
    );

    // The HTTP surface is ready as soon as the listener binds
    match session.restore(std::future::ready(())).await {
        RestoreOutcome::Restored(route) => tracing::info!(
            "Resumed navigation to '{}' ({:.0}m)",
            route.destination_label,
            route.total_distance_meters
        ),
        outcome => tracing::debug!("Session restore: {:?}", outcome),
    }

    // Create application state
    let state = Arc::new(AppState {
        addresses: AddressGenerator::new(zone.clone())
            .with_walking_speed(config.navigation.walking_speed_m_per_min),
        zone,
        positions,
        last_position: LastPositionStore::new(store.clone()),
        zone_tracker: ZoneTracker::new(),
        session,
        places,
        alerts,
        store,
        cache: Some(cache),
    });

    // Build router with CORS and tracing
    let app = Router::new()
        .nest("/api/v1", camayenne_nav::routes::create_router(state))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = config.server_address();
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn open_sqlite_store(path: &str) -> Result<SqliteKvStore, sqlx::Error> {
    let pool = camayenne_nav::db::create_pool(path).await?;
    SqliteKvStore::create_schema(&pool).await?;
    Ok(SqliteKvStore::new(pool))
}
