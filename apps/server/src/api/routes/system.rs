//! Operational routes: liveness and Prometheus metrics

use crate::api::handlers::metrics;
use crate::state::AppState;
use axum::{response::IntoResponse, routing::get, Json, Router};
use serde_json::json;

pub fn system_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics::metrics_handler))
}

async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "ggtable",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
