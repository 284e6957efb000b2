use crate::constants::{STORE_KEY_ACTIVE_ROUTE, STORE_KEY_IS_NAVIGATING, STORE_KEY_TIMESTAMP};
use crate::db::KeyValueStore;
use crate::models::{now_epoch_ms, Route};
use std::sync::Arc;

/// A persisted navigation session.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub route: Route,
    pub is_navigating: bool,
    pub timestamp_epoch_ms: i64,
}

impl SessionSnapshot {
    pub fn age_ms(&self, now_epoch_ms: i64) -> i64 {
        now_epoch_ms - self.timestamp_epoch_ms
    }
}

/// Best-effort snapshot storage. Store failures are logged and swallowed.
#[derive(Clone)]
pub struct SnapshotStore {
    store: Arc<dyn KeyValueStore>,
}

impl SnapshotStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        SnapshotStore { store }
    }

    pub async fn save(&self, route: &Route) {
        self.save_at(route, now_epoch_ms()).await
    }

    pub async fn save_at(&self, route: &Route, timestamp_epoch_ms: i64) {
        let json = match serde_json::to_string(route) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("Failed to serialize route snapshot: {}", e);
                return;
            }
        };

        let writes = [
            (STORE_KEY_ACTIVE_ROUTE, json),
            (STORE_KEY_IS_NAVIGATING, "true".to_string()),
            (STORE_KEY_TIMESTAMP, timestamp_epoch_ms.to_string()),
        ];
        for (key, value) in writes.iter() {
            if let Err(e) = self.store.set(key, value).await {
                tracing::warn!(key = *key, "Failed to persist navigation snapshot: {}", e);
                return;
            }
        }

        tracing::debug!(
            route_id = %route.id,
            timestamp_epoch_ms,
            "Navigation snapshot saved"
        );
    }

    /// `None` when nothing is stored, the store fails, or the snapshot is
    /// unreadable. Unreadable snapshots are cleared.
    pub async fn load(&self) -> Option<SessionSnapshot> {
        let route_json = self.read(STORE_KEY_ACTIVE_ROUTE).await?;
        let is_navigating = self.read(STORE_KEY_IS_NAVIGATING).await;
        let timestamp = self.read(STORE_KEY_TIMESTAMP).await;

        let route: Route = match serde_json::from_str(&route_json) {
            Ok(route) => route,
            Err(e) => {
                tracing::warn!("Discarding unreadable navigation snapshot: {}", e);
                self.clear().await;
                return None;
            }
        };

        let timestamp_epoch_ms = match timestamp.as_deref().map(str::parse::<i64>) {
            Some(Ok(ts)) => ts,
            _ => {
                tracing::warn!("Discarding navigation snapshot without a valid timestamp");
                self.clear().await;
                return None;
            }
        };

        Some(SessionSnapshot {
            route,
            is_navigating: is_navigating.as_deref() == Some("true"),
            timestamp_epoch_ms,
        })
    }

    pub async fn clear(&self) {
        for key in [STORE_KEY_ACTIVE_ROUTE, STORE_KEY_IS_NAVIGATING, STORE_KEY_TIMESTAMP] {
            if let Err(e) = self.store.remove(key).await {
                tracing::warn!(key, "Failed to clear navigation snapshot: {}", e);
            }
        }
    }

    async fn read(&self, key: &str) -> Option<String> {
        match self.store.get(key).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, "Failed to read navigation snapshot: {}", e);
                None
            }
        }
    }
}
