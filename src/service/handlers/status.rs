//! Query status endpoint

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};

use crate::service::handlers::error_reply;
use crate::service::server::AppState;
use crate::service::types::{ErrorResponse, QueryEvent, ServiceError};

/// Look up the recorded event for a request identifier
///
/// 404 covers both an identifier that was never issued and one whose
/// write is still in flight; the caller cannot tell them apart, by design.
pub async fn query_status(
    State(state): State<AppState>,
    Path(request_id): Path<String>,
) -> Result<Json<QueryEvent>, (StatusCode, Json<ErrorResponse>)> {
    let event = state
        .events
        .event_by_request_id(&request_id)
        .await
        .map_err(|e| {
            tracing::error!(request_id = %request_id, "event lookup failed: {}", e);
            error_reply(ServiceError::Store(e))
        })?;

    match event {
        Some(event) => Ok(Json(event)),
        None => Err(error_reply(ServiceError::RequestIdNotFound)),
    }
}
