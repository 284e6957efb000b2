use crate::error::Result;
use crate::models::now_epoch_ms;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Durable string key-value storage with get/set/remove semantics.
///
/// Every write stamps the entry with its write time, which the sweeping
/// operations use to expire or bound groups of keys sharing a prefix.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;

    /// Delete every key starting with `prefix` written before
    /// `cutoff_epoch_ms`. Returns how many were deleted.
    async fn remove_older_than(&self, prefix: &str, cutoff_epoch_ms: i64) -> Result<u64>;

    /// Keep only the `limit` most recently written keys starting with
    /// `prefix`. Returns how many were deleted.
    async fn retain_newest(&self, prefix: &str, limit: u64) -> Result<u64>;

    async fn health_check(&self) -> bool;

    fn backend_name(&self) -> &'static str;
}

struct StoredValue {
    value: String,
    updated_at_epoch_ms: i64,
}

/// Process-local store, used when the SQLite file cannot be opened and in tests.
#[derive(Default)]
pub struct MemoryKvStore {
    entries: RwLock<HashMap<String, StoredValue>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .entries
            .read()
            .await
            .get(key)
            .map(|stored| stored.value.clone()))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries.write().await.insert(
            key.to_string(),
            StoredValue {
                value: value.to_string(),
                updated_at_epoch_ms: now_epoch_ms(),
            },
        );
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn remove_older_than(&self, prefix: &str, cutoff_epoch_ms: i64) -> Result<u64> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, stored| {
            !(key.starts_with(prefix) && stored.updated_at_epoch_ms < cutoff_epoch_ms)
        });
        Ok((before - entries.len()) as u64)
    }

    async fn retain_newest(&self, prefix: &str, limit: u64) -> Result<u64> {
        let mut entries = self.entries.write().await;
        let mut matching: Vec<(i64, String)> = entries
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, stored)| (stored.updated_at_epoch_ms, key.clone()))
            .collect();

        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        if matching.len() <= limit {
            return Ok(0);
        }

        // Newest first; ties broken by key so both backends agree
        matching.sort_unstable_by(|a, b| b.cmp(a));
        let stale = matching.split_off(limit);
        for (_, key) in &stale {
            entries.remove(key);
        }
        Ok(stale.len() as u64)
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
    use std::time::Duration;

    #[tokio::test]
    async fn set_get_remove() {
        let store = MemoryKvStore::new();
        assert!(store.get("k").await.unwrap().is_none());

        store.set("k", "v1").await.unwrap();
        store.set("k", "v2").await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v2"));
        assert_eq!(store.len().await, 1);

        store.remove("k").await.unwrap();
        store.remove("k").await.unwrap();
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn remove_older_than_only_touches_prefix() {
        let store = MemoryKvStore::new();
        store.set("route:a", "1").await.unwrap();
        store.set("route:b", "2").await.unwrap();
        store.set("nav_activeRoute", "{}").await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        let cutoff = now_epoch_ms();
        store.set("route:c", "3").await.unwrap();

        assert_eq!(store.remove_older_than("route:", cutoff).await.unwrap(), 2);
        assert!(store.get("route:a").await.unwrap().is_none());
        assert_eq!(store.get("route:c").await.unwrap().as_deref(), Some("3"));
        assert!(store.get("nav_activeRoute").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn retain_newest_drops_oldest_writes() {
        let store = MemoryKvStore::new();
        for key in ["route:1", "route:2", "route:3"] {
            store.set(key, "x").await.unwrap();
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        store.set("last_position", "{}").await.unwrap();

        assert_eq!(store.retain_newest("route:", 2).await.unwrap(), 1);
        assert!(store.get("route:1").await.unwrap().is_none());
        assert!(store.get("route:3").await.unwrap().is_some());
        assert_eq!(store.retain_newest("route:", 2).await.unwrap(), 0);
        assert_eq!(store.len().await, 3);
    }
}
