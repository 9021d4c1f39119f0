//! Health check endpoint

use axum::response::Json;

use crate::service::types::HealthResponse;

/// Liveness probe; always `{"status":"ok"}`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}
