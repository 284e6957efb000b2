use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

pub mod kv_store;
pub mod sqlite_store;

pub use kv_store::{KeyValueStore, MemoryKvStore};
pub use sqlite_store::SqliteKvStore;

/// Open (creating if needed) the SQLite file backing the key-value store.
pub async fn create_pool(store_path: &str) -> Result<SqlitePool, sqlx::Error> {
    let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}", store_path))?
        .create_if_missing(true)
        .pragma("journal_mode", "WAL");

    SqlitePoolOptions::new()
        .max_connections(4)
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(opts)
        .await
}
