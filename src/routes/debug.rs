use crate::AppState;
use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

/// GET /debug/health - Check if services are working
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    let mut status = json!({
        "status": "ok",
        "checks": {}
    });

    // Check key-value store
    if state.store.health_check().await {
        status["checks"]["store"] = json!({ "backend": state.store.backend_name(), "status": "ok" });
    } else {
        status["checks"]["store"] = json!({ "backend": state.store.backend_name(), "status": "error" });
        status["status"] = json!("degraded");
    }

    // Check route cache
    match state.cache {
        Some(ref cache) => {
            let stats = cache.get_stats().await;
            status["checks"]["route_cache"] = json!({
                "backend": cache.backend_name(),
                "stats": stats,
            });
        }
        None => {
            status["checks"]["route_cache"] = json!("disabled");
        }
    }

    status["checks"]["zone"] = json!({
        "name": state.zone.name(),
        "landmarks": state.zone.landmarks().len(),
    });
    status["checks"]["places"] = json!(state.places.len());
    status["checks"]["alerts"] = json!(state.alerts.len());
    status["checks"]["navigation"] = json!(state.session.view().await.state);
    status["checks"]["position_watchers"] = json!(state.positions.watcher_count());

    Json(status)
}
