use crate::db::KeyValueStore;
use crate::error::Result;
use crate::models::now_epoch_ms;
use async_trait::async_trait;
use sqlx::sqlite::SqlitePool;

/// Key-value store persisted in a single SQLite table.
pub struct SqliteKvStore {
    pool: SqlitePool,
}

impl SqliteKvStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the `kv_store` table. Idempotent. `updated_at` is epoch milliseconds.
    pub async fn create_schema(pool: &SqlitePool) -> std::result::Result<(), sqlx::Error> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS kv_store (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL DEFAULT (CAST(strftime('%s', 'now') AS INTEGER) * 1000)
            )",
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM kv_store")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl KeyValueStore for SqliteKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM kv_store WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            "INSERT OR REPLACE INTO kv_store (key, value, updated_at)
             VALUES (?1, ?2, ?3)",
        )
        .bind(key)
        .bind(value)
        .bind(now_epoch_ms())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM kv_store WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn remove_older_than(&self, prefix: &str, cutoff_epoch_ms: i64) -> Result<u64> {
        let result = sqlx::query(
            "DELETE FROM kv_store
             WHERE substr(key, 1, length(?1)) = ?1 AND updated_at < ?2",
        )
        .bind(prefix)
        .bind(cutoff_epoch_ms)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn retain_newest(&self, prefix: &str, limit: u64) -> Result<u64> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let result = sqlx::query(
            "DELETE FROM kv_store
             WHERE substr(key, 1, length(?1)) = ?1
               AND key NOT IN (
                   SELECT key FROM kv_store
                   WHERE substr(key, 1, length(?1)) = ?1
                   ORDER BY updated_at DESC, key DESC
                   LIMIT ?2
               )",
        )
        .bind(prefix)
        .bind(limit)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn health_check(&self) -> bool {
        match sqlx::query("SELECT 1").fetch_one(&self.pool).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!("Key-value store health check failed: {}", e);
                false
            }
        }
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}

#[cfg(test)]
#[path = "sqlite_store_tests.rs"]
mod sqlite_store_tests;
