//! Stable application-wide constants.
//!
//! Values here are geometric constants, navigation thresholds, and default
//! fallbacks for env-var-based configuration. They should rarely change.
//! For values that vary per deployment, see
//! [`NavigationConfig`](crate::config::NavigationConfig) instead.

// --- Server defaults (used when HOST / PORT env vars are absent) ---

/// Default bind address. The server only talks to the app on the same device.
pub const DEFAULT_HOST: &str = "127.0.0.1";
/// Default port for the HTTP server.
pub const DEFAULT_PORT: &str = "3000";

// --- Geometry ---

/// Mean Earth radius used by the haversine distance, in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;
/// Accuracy assumed when a position report omits it.
pub const DEFAULT_ACCURACY_METERS: f64 = 10.0;

// --- Routing provider defaults ---

/// Public OSRM demo server. Overridden by `ROUTING_BASE_URL`.
pub const DEFAULT_ROUTING_BASE_URL: &str = "https://router.project-osrm.org/route/v1";
/// Walking profile path segment. Overridden by `ROUTING_PROFILE`.
pub const DEFAULT_ROUTING_PROFILE: &str = "foot";
/// Per-request timeout for the routing provider.
pub const DEFAULT_ROUTING_TIMEOUT_SECONDS: u64 = 10;

// --- Route acquisition ---

/// Walking pace used to estimate direct-line durations (~4.8 km/h).
pub const DEFAULT_WALKING_SPEED_M_PER_MIN: f64 = 80.0;
/// Decimal places endpoints are rounded to when keying the offline route cache
/// (~11 m at the equator).
pub const ROUTE_CACHE_KEY_PRECISION: u32 = 4;
/// Every cached route key starts with this; purges sweep by it.
pub const ROUTE_CACHE_KEY_PREFIX: &str = "route:";
/// Offline route cache TTL: 24 hours. Overridden by `ROUTE_CACHE_TTL`.
pub const DEFAULT_ROUTE_CACHE_TTL_SECONDS: u64 = 86_400;
/// Maximum routes kept by either route cache backend.
pub const DEFAULT_ROUTE_CACHE_MAX_ENTRIES: u64 = 500;

// --- Route session ---

/// A persisted route older than this is discarded on restore: 4 hours.
pub const DEFAULT_SESSION_TTL_SECONDS: u64 = 14_400;
/// Remaining distance under which the user counts as arrived.
pub const DEFAULT_ARRIVAL_RADIUS_METERS: f64 = 30.0;
/// How long a restore waits for the display surface before giving up.
pub const DEFAULT_DISPLAY_READY_TIMEOUT_MS: u64 = 5_000;
/// Buffered session events per subscriber before slow subscribers lag.
pub const NAVIGATION_EVENT_CAPACITY: usize = 64;
/// Buffered position reports per live subscriber.
pub const POSITION_FEED_CAPACITY: usize = 32;

// --- Persisted session keys ---

pub const STORE_KEY_ACTIVE_ROUTE: &str = "nav_activeRoute";
pub const STORE_KEY_IS_NAVIGATING: &str = "nav_isNavigating";
pub const STORE_KEY_TIMESTAMP: &str = "nav_timestamp";
/// Last fix the device reported, kept across restarts.
pub const STORE_KEY_LAST_POSITION: &str = "last_position";

// --- Places and alerts ---

/// Places returned by a nearest-places lookup when no limit is given.
pub const DEFAULT_NEAREST_PLACES_LIMIT: usize = 5;
/// Radius of an alert area that does not declare one.
pub const DEFAULT_ALERT_RADIUS_METERS: f64 = 500.0;

// --- Storage defaults ---

/// SQLite file holding the key-value store. Overridden by `STORE_PATH`.
pub const DEFAULT_STORE_PATH: &str = "camayenne-nav.db";
