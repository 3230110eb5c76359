use crate::services::metrics;
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

/// Endpoint to verify API functionality independent of remote-model state.
pub async fn api_test() -> impl IntoResponse {
    Json(json!({ "status": "API is working!" }))
}

/// Health check endpoint for liveness probes.
pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "service": "gita-service",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// Prometheus metrics in text format.
pub async fn metrics() -> String {
    metrics::get_metrics()
}
