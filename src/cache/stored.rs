use crate::cache::{CacheStats, RouteCache};
use crate::constants::ROUTE_CACHE_KEY_PREFIX;
use crate::db::KeyValueStore;
use crate::models::{now_epoch_ms, Route};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Route cache persisted in the key-value store, so cached routes survive
/// restarts. Entries carry their write time. Expired entries are swept on
/// every read and write, and at most `max_entries` routes are kept.
pub struct StoredRouteCache {
    store: Arc<dyn KeyValueStore>,
    ttl_ms: i64,
    max_entries: u64,
    hits: AtomicU64,
    misses: AtomicU64,
}

#[derive(Serialize, Deserialize)]
struct CachedRouteEntry {
    route: Route,
    cached_at_epoch_ms: i64,
}

impl StoredRouteCache {
    pub fn new(store: Arc<dyn KeyValueStore>, ttl_seconds: u64, max_entries: u64) -> Self {
        StoredRouteCache {
            store,
            ttl_ms: i64::try_from(ttl_seconds)
                .unwrap_or(i64::MAX)
                .saturating_mul(1000),
            max_entries,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Delete expired routes, then the oldest beyond `max_entries`.
    /// Returns how many entries were removed.
    pub async fn purge(&self) -> u64 {
        let cutoff = now_epoch_ms().saturating_sub(self.ttl_ms);
        let expired = match self
            .store
            .remove_older_than(ROUTE_CACHE_KEY_PREFIX, cutoff)
            .await
        {
            Ok(n) => n,
            Err(e) => {
                tracing::warn!("Failed to purge expired cached routes: {}", e);
                0
            }
        };

        let overflow = match self
            .store
            .retain_newest(ROUTE_CACHE_KEY_PREFIX, self.max_entries)
            .await
        {
            Ok(n) => n,
            Err(e) => {
                tracing::warn!("Failed to bound cached routes: {}", e);
                0
            }
        };

        if expired + overflow > 0 {
            tracing::debug!(expired, overflow, "Purged stored cached routes");
        }
        expired + overflow
    }

    fn miss(&self) -> Option<Route> {
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    async fn evict(&self, key: &str) {
        if let Err(e) = self.store.remove(key).await {
            tracing::warn!("Failed to evict cached route {}: {}", key, e);
        }
    }
}

#[async_trait]
impl RouteCache for StoredRouteCache {
    async fn get_cached_route(&self, key: &str) -> Option<Route> {
        self.purge().await;

        let json = match self.store.get(key).await {
            Ok(Some(json)) => json,
            Ok(None) => {
                tracing::debug!("Stored cache miss for route: {}", key);
                return self.miss();
            }
            Err(e) => {
                tracing::warn!("Store error reading cached route {}: {}", key, e);
                return self.miss();
            }
        };

        let entry: CachedRouteEntry = match serde_json::from_str(&json) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Failed to deserialize cached route {}: {}", key, e);
                self.evict(key).await;
                return self.miss();
            }
        };

        let age_ms = now_epoch_ms() - entry.cached_at_epoch_ms;
        if age_ms > self.ttl_ms {
            tracing::debug!(age_ms, "Stored cached route expired: {}", key);
            self.evict(key).await;
            return self.miss();
        }

        self.hits.fetch_add(1, Ordering::Relaxed);
        tracing::debug!("Stored cache hit for route: {}", key);
        Some(entry.route)
    }

    async fn cache_route(&self, key: &str, route: &Route) {
        let entry = CachedRouteEntry {
            route: route.clone(),
            cached_at_epoch_ms: now_epoch_ms(),
        };
        let json = match serde_json::to_string(&entry) {
            Ok(j) => j,
            Err(e) => {
                tracing::warn!("Failed to serialize route for cache: {}", e);
                return;
            }
        };

        match self.store.set(key, &json).await {
            Ok(()) => tracing::debug!("Stored cached route: {}", key),
            Err(e) => tracing::warn!("Failed to cache route {}: {}", key, e),
        }
        self.purge().await;
    }

    async fn get_stats(&self) -> CacheStats {
        CacheStats::from_counts(
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
            self.store.health_check().await,
        )
    }

    async fn health_check(&self) -> bool {
        self.store.health_check().await
    }

    fn backend_name(&self) -> &'static str {
        "stored"
    }
}
