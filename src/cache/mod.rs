use crate::constants::{ROUTE_CACHE_KEY_PRECISION, ROUTE_CACHE_KEY_PREFIX};
use crate::models::{Coordinates, Route};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod memory;
pub mod stored;

pub use memory::MemoryRouteCache;
pub use stored::StoredRouteCache;

/// Offline cache of provider routes, consulted when the provider is unreachable.
/// Implementations never fail: errors degrade to a miss.
#[async_trait]
pub trait RouteCache: Send + Sync {
    async fn get_cached_route(&self, key: &str) -> Option<Route>;

    async fn cache_route(&self, key: &str, route: &Route);

    async fn get_stats(&self) -> CacheStats;

    async fn health_check(&self) -> bool;

    fn backend_name(&self) -> &'static str;
}

/// Cache key for a walking route: both endpoints rounded to 4 decimals
/// (~11 m), e.g. `route:9.5376,-13.6827_9.5444,-13.6764`.
pub fn route_cache_key(origin: &Coordinates, destination: &Coordinates) -> String {
    let p = ROUTE_CACHE_KEY_PRECISION as usize;
    format!(
        "{}{:.*},{:.*}_{:.*},{:.*}",
        ROUTE_CACHE_KEY_PREFIX,
        p, origin.lat, p, origin.lng, p, destination.lat, p, destination.lng
    )
}

/// Cache statistics for monitoring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub connected: bool,
}

impl CacheStats {
    pub(crate) fn from_counts(hits: u64, misses: u64, connected: bool) -> Self {
        let hit_rate = if hits + misses > 0 {
            (hits as f64 / (hits + misses) as f64) * 100.0
        } else {
            0.0
        };

        CacheStats {
            hits,
            misses,
            hit_rate,
            connected,
        }
    }
}
