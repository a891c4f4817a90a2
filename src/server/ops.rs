//! Liveness/readiness and runtime metrics endpoints (§6, §4.12).

use std::sync::Arc;

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::app::AppContext;

pub async fn healthz() -> Response {
    axum::Json(json!({ "status": "ok" })).into_response()
}

pub async fn readyz(State(ctx): State<Arc<AppContext>>) -> Response {
    let ready = ctx.search_cache.exists("__readyz_probe__").await.is_ok();
    axum::Json(json!({ "ready": ready })).into_response()
}

pub async fn metrics(State(ctx): State<Arc<AppContext>>) -> Response {
    let snapshot = ctx.metrics.snapshot_all().await;
    axum::Json(json!({ "plugins": snapshot })).into_response()
}

pub async fn plugin_scores(State(ctx): State<Arc<AppContext>>) -> Response {
    let mut scores = serde_json::Map::new();
    for name in ctx.plugin_registry.list_names() {
        let breaker = ctx.metrics.breaker_state(name).await;
        let counters = ctx.metrics.counters_for(name).await;
        scores.insert(
            name.to_string(),
            json!({
                "breaker_state": breaker,
                "counters": counters.snapshot(),
                "latency_ewma_millis": counters.latency_ewma_millis().await,
            }),
        );
    }
    axum::Json(serde_json::Value::Object(scores)).into_response()
}
