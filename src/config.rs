use crate::constants::*;
use crate::models::ZoneDefinition;
use crate::services::alerts::AlertBoard;
use crate::services::places::PlaceCatalog;
use std::env;
use std::time::Duration;

/// Zone shipped with the binary; `ZONE_FILE` replaces it.
const EMBEDDED_ZONE: &str = include_str!("../data/zone.json");
/// Places shipped with the binary; `PLACES_FILE` replaces them.
const EMBEDDED_PLACES: &str = include_str!("../data/places.json");
/// Alerts shipped with the binary; `ALERTS_FILE` replaces them.
const EMBEDDED_ALERTS: &str = include_str!("../data/alerts.json");

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub routing_base_url: String,
    pub routing_profile: String,
    pub routing_timeout_secs: u64,
    pub store_path: String,
    pub zone_file: Option<String>,
    pub places_file: Option<String>,
    pub alerts_file: Option<String>,
    pub route_cache_ttl: u64,
    pub route_cache_max_entries: u64,
    pub navigation: NavigationConfig,
}

/// Knobs for route acquisition and the route session.
#[derive(Debug, Clone)]
pub struct NavigationConfig {
    /// Walking pace for direct-line duration estimates
    pub walking_speed_m_per_min: f64,

    /// Remaining distance (meters) under which arrival is announced
    pub arrival_radius_m: f64,

    /// Persisted routes older than this are discarded on restore
    pub session_ttl: Duration,

    /// How long a restore waits for the display surface
    pub display_ready_timeout: Duration,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            walking_speed_m_per_min: DEFAULT_WALKING_SPEED_M_PER_MIN,
            arrival_radius_m: DEFAULT_ARRIVAL_RADIUS_METERS,
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECONDS),
            display_ready_timeout: Duration::from_millis(DEFAULT_DISPLAY_READY_TIMEOUT_MS),
        }
    }
}

impl NavigationConfig {
    pub fn from_env() -> Result<Self, String> {
        let defaults = Self::default();

        let walking_speed_m_per_min: f64 = env::var("WALKING_SPEED_M_PER_MIN")
            .unwrap_or_else(|_| defaults.walking_speed_m_per_min.to_string())
            .parse()
            .map_err(|_| "Invalid WALKING_SPEED_M_PER_MIN")?;
        if !(walking_speed_m_per_min > 0.0 && walking_speed_m_per_min <= 500.0) {
            return Err("WALKING_SPEED_M_PER_MIN must be between 0 and 500".to_string());
        }

        let arrival_radius_m: f64 = env::var("ARRIVAL_RADIUS_M")
            .unwrap_or_else(|_| defaults.arrival_radius_m.to_string())
            .parse()
            .map_err(|_| "Invalid ARRIVAL_RADIUS_M")?;
        if !(arrival_radius_m > 0.0 && arrival_radius_m <= 500.0) {
            return Err("ARRIVAL_RADIUS_M must be between 0 and 500 meters".to_string());
        }

        let session_ttl_secs: u64 = env::var("SESSION_TTL_SECS")
            .unwrap_or_else(|_| defaults.session_ttl.as_secs().to_string())
            .parse()
            .map_err(|_| "Invalid SESSION_TTL_SECS")?;

        let display_ready_timeout_ms: u64 = env::var("DISPLAY_READY_TIMEOUT_MS")
            .unwrap_or_else(|_| (defaults.display_ready_timeout.as_millis() as u64).to_string())
            .parse()
            .map_err(|_| "Invalid DISPLAY_READY_TIMEOUT_MS")?;

        Ok(Self {
            walking_speed_m_per_min,
            arrival_radius_m,
            session_ttl: Duration::from_secs(session_ttl_secs),
            display_ready_timeout: Duration::from_millis(display_ready_timeout_ms),
        })
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        dotenv::dotenv().ok();

        let routing_timeout_secs: u64 = env::var("ROUTING_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_ROUTING_TIMEOUT_SECONDS.to_string())
            .parse()
            .map_err(|_| "Invalid ROUTING_TIMEOUT_SECS")?;

        if !(1..=120).contains(&routing_timeout_secs) {
            return Err("ROUTING_TIMEOUT_SECS must be between 1 and 120 seconds".to_string());
        }

        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_PORT.to_string())
                .parse()
                .map_err(|_| "Invalid PORT")?,
            routing_base_url: env::var("ROUTING_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_ROUTING_BASE_URL.to_string()),
            routing_profile: env::var("ROUTING_PROFILE")
                .unwrap_or_else(|_| DEFAULT_ROUTING_PROFILE.to_string()),
            routing_timeout_secs,
            store_path: env::var("STORE_PATH").unwrap_or_else(|_| DEFAULT_STORE_PATH.to_string()),
            zone_file: env::var("ZONE_FILE").ok(),
            places_file: env::var("PLACES_FILE").ok(),
            alerts_file: env::var("ALERTS_FILE").ok(),
            route_cache_ttl: env::var("ROUTE_CACHE_TTL")
                .unwrap_or_else(|_| DEFAULT_ROUTE_CACHE_TTL_SECONDS.to_string())
                .parse()
                .map_err(|_| "Invalid ROUTE_CACHE_TTL")?,
            route_cache_max_entries: env::var("ROUTE_CACHE_MAX_ENTRIES")
                .unwrap_or_else(|_| DEFAULT_ROUTE_CACHE_MAX_ENTRIES.to_string())
                .parse()
                .map_err(|_| "Invalid ROUTE_CACHE_MAX_ENTRIES")?,
            navigation: NavigationConfig::from_env()?,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Load the zone once at startup, from `ZONE_FILE` when set.
    pub fn load_zone(&self) -> Result<ZoneDefinition, String> {
        match self.zone_file {
            Some(ref path) => ZoneDefinition::from_json(&read_data_file("ZONE_FILE", path)?),
            None => embedded_zone(),
        }
    }

    /// Load the place catalog, from `PLACES_FILE` when set.
    pub fn load_places(&self) -> Result<PlaceCatalog, String> {
        match self.places_file {
            Some(ref path) => PlaceCatalog::from_json(&read_data_file("PLACES_FILE", path)?),
            None => embedded_places(),
        }
    }

    /// Load the alert board, from `ALERTS_FILE` when set.
    pub fn load_alerts(&self) -> Result<AlertBoard, String> {
        match self.alerts_file {
            Some(ref path) => AlertBoard::from_json(&read_data_file("ALERTS_FILE", path)?),
            None => embedded_alerts(),
        }
    }
}

fn read_data_file(var: &str, path: &str) -> Result<String, String> {
    std::fs::read_to_string(path).map_err(|e| format!("Failed to read {} {}: {}", var, path, e))
}

/// The zone definition compiled into the binary.
pub fn embedded_zone() -> Result<ZoneDefinition, String> {
    ZoneDefinition::from_json(EMBEDDED_ZONE)
}

/// The place catalog compiled into the binary.
pub fn embedded_places() -> Result<PlaceCatalog, String> {
    PlaceCatalog::from_json(EMBEDDED_PLACES)
}

/// The alerts compiled into the binary.
pub fn embedded_alerts() -> Result<AlertBoard, String> {
    AlertBoard::from_json(EMBEDDED_ALERTS)
}
