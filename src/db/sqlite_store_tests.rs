use super::*;
use sqlx::sqlite::SqlitePoolOptions;

async fn setup_test_store() -> SqliteKvStore {
    // One connection: every `sqlite::memory:` connection is its own database
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory SQLite pool");
    SqliteKvStore::create_schema(&pool)
        .await
        .expect("Failed to create schema");
    SqliteKvStore::new(pool)
}

#[tokio::test]
async fn create_schema_idempotent() {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    SqliteKvStore::create_schema(&pool).await.unwrap();
    SqliteKvStore::create_schema(&pool).await.unwrap();
}

#[tokio::test]
async fn get_missing_key() {
    let store = setup_test_store().await;
    assert!(store.get("nav_activeRoute").await.unwrap().is_none());
}

#[tokio::test]
async fn set_overwrites() {
    let store = setup_test_store().await;
    store.set("nav_isNavigating", "false").await.unwrap();
    store.set("nav_isNavigating", "true").await.unwrap();

    assert_eq!(
        store.get("nav_isNavigating").await.unwrap().as_deref(),
        Some("true")
    );
    assert_eq!(store.count().await.unwrap(), 1);
}

#[tokio::test]
async fn remove_is_idempotent() {
    let store = setup_test_store().await;
    store.set("nav_timestamp", "1700000000000").await.unwrap();
    store.remove("nav_timestamp").await.unwrap();
    store.remove("nav_timestamp").await.unwrap();

    assert!(store.get("nav_timestamp").await.unwrap().is_none());
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn health_and_backend() {
    let store = setup_test_store().await;
    assert!(store.health_check().await);
    assert_eq!(store.backend_name(), "sqlite");
}

#[tokio::test]
async fn remove_older_than_sweeps_prefix() {
    let store = setup_test_store().await;
    store.set("route:a", "{}").await.unwrap();
    store.set("route:b", "{}").await.unwrap();
    store.set("nav_timestamp", "1700000000000").await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let cutoff = now_epoch_ms();
    store.set("route:c", "{}").await.unwrap();

    assert_eq!(store.remove_older_than("route:", cutoff).await.unwrap(), 2);
    assert!(store.get("route:c").await.unwrap().is_some());
    assert!(store.get("nav_timestamp").await.unwrap().is_some());
    assert_eq!(store.count().await.unwrap(), 2);
}

#[tokio::test]
async fn retain_newest_bounds_prefix() {
    let store = setup_test_store().await;
    for key in ["route:1", "route:2", "route:3", "route:4"] {
        store.set(key, "{}").await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }
    store.set("last_position", "{}").await.unwrap();

    assert_eq!(store.retain_newest("route:", 2).await.unwrap(), 2);
    assert!(store.get("route:1").await.unwrap().is_none());
    assert!(store.get("route:2").await.unwrap().is_none());
    assert!(store.get("route:4").await.unwrap().is_some());
    assert!(store.get("last_position").await.unwrap().is_some());
    assert_eq!(store.retain_newest("route:", 2).await.unwrap(), 0);
}
