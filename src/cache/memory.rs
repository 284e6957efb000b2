use crate::cache::{CacheStats, RouteCache};
use crate::models::Route;
use async_trait::async_trait;
use moka::future::Cache;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// In-memory route cache backed by moka with TTL and bounded capacity.
pub struct MemoryRouteCache {
    routes: Cache<String, Arc<Route>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MemoryRouteCache {
    pub fn new(route_ttl_seconds: u64, max_capacity: u64) -> Self {
        let routes = Cache::builder()
            .time_to_live(Duration::from_secs(route_ttl_seconds))
            .max_capacity(max_capacity)
            .build();

        MemoryRouteCache {
            routes,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl RouteCache for MemoryRouteCache {
    async fn get_cached_route(&self, key: &str) -> Option<Route> {
        match self.routes.get(key).await {
            Some(route) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                tracing::debug!("Memory cache hit for route: {}", key);
                Some((*route).clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                tracing::debug!("Memory cache miss for route: {}", key);
                None
            }
        }
    }

    async fn cache_route(&self, key: &str, route: &Route) {
        self.routes
            .insert(key.to_string(), Arc::new(route.clone()))
            .await;
        tracing::debug!(
            distance_m = route.total_distance_meters,
            "Memory cached route: {}",
            key
        );
    }

    async fn get_stats(&self) -> CacheStats {
        CacheStats::from_counts(
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
            true,
        )
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Coordinates;
    use uuid::Uuid;

    fn make_test_route(distance: f64) -> Route {
        Route {
            id: Uuid::new_v4(),
            origin: Coordinates { lat: 9.5376, lng: -13.6827 },
            destination: Coordinates { lat: 9.5444, lng: -13.6764 },
            destination_label: "UGANC".to_string(),
            total_distance_meters: distance,
            total_duration_seconds: distance / 80.0 * 60.0,
            polyline: Some(vec![]),
            steps: vec![],
            is_fallback: false,
        }
    }

    #[tokio::test]
    async fn cache_miss() {
        let cache = MemoryRouteCache::new(3600, 100);
        assert!(cache.get_cached_route("nonexistent").await.is_none());
    }

    #[tokio::test]
    async fn store_and_fetch() {
        let cache = MemoryRouteCache::new(3600, 100);
        cache.cache_route("key1", &make_test_route(1200.0)).await;

        let cached = cache.get_cached_route("key1").await.unwrap();
        assert_eq!(cached.total_distance_meters, 1200.0);
        assert_eq!(cached.destination_label, "UGANC");
    }

    #[tokio::test]
    async fn stats_tracking() {
        let cache = MemoryRouteCache::new(3600, 100);
        cache.cache_route("key1", &make_test_route(500.0)).await;

        cache.get_cached_route("missing").await;
        cache.get_cached_route("key1").await;
        cache.get_cached_route("key1").await;

        let stats = cache.get_stats().await;
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert!(stats.connected);
        assert_eq!(cache.backend_name(), "memory");
    }

    #[tokio::test]
    async fn ttl_expiry() {
        let cache = MemoryRouteCache::new(1, 100);
        cache.cache_route("key1", &make_test_route(500.0)).await;
        assert!(cache.get_cached_route("key1").await.is_some());

        tokio::time::sleep(Duration::from_secs(2)).await;

        assert!(cache.get_cached_route("key1").await.is_none());
    }
}
