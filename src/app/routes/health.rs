use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;
use serde_json::{json, Value};

use crate::adapters::cache::CacheState;
use crate::app::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub environment: String,
    pub cache: CacheState,
    pub uptime_seconds: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_mb: Option<u64>,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthReport> {
    let cache = state.cache.health_check().await;
    let stats = state.monitor.snapshot();

    Json(HealthReport {
        status: "healthy",
        environment: state.config.server.environment.to_string(),
        cache,
        uptime_seconds: state.monitor.uptime().as_secs(),
        memory_mb: stats.map(|s| s.memory_mb),
    })
}

pub async fn service_info() -> Json<Value> {
    Json(json!({
        "message": "SmartFit API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "endpoints": {
            "auth": "/api/auth",
            "users": "/api/users",
            "orders": "/api/orders",
            "products": "/api/products",
            "try_on": "/api/try-on",
            "health": "/health",
        },
    }))
}
