//! Variant query endpoint

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::service::handlers::error_reply;
use crate::service::server::AppState;
use crate::service::types::{ErrorResponse, QueryEvent, ServiceError, VariantsResponse};

/// Query parameters for `/variants`
#[derive(Debug, Deserialize)]
pub struct VariantsParams {
    /// Gene symbol to match exactly (required, must be non-empty)
    pub gene: Option<String>,
}

/// Return all variants for a gene and enqueue the audit event
///
/// The enqueue is fire-and-forget: the event becomes visible via
/// `/status/{request_id}` whenever the worker gets to it, and a queue
/// failure is logged without affecting the response. Only a variant-store
/// failure turns into an error status.
pub async fn query_variants(
    State(state): State<AppState>,
    Query(params): Query<VariantsParams>,
) -> Result<Json<VariantsResponse>, (StatusCode, Json<ErrorResponse>)> {
    let gene = match params.gene.as_deref() {
        Some(gene) if !gene.is_empty() => gene.to_string(),
        _ => return Err(error_reply(ServiceError::MissingGene)),
    };

    let request_id = Uuid::new_v4().to_string();
    let event = QueryEvent::received(request_id.clone(), gene.clone(), Utc::now());

    match state.queue.enqueue(&event).await {
        Ok(ack) => {
            tracing::debug!(request_id = %request_id, message_id = %ack.message_id, "query event enqueued");
        }
        Err(e) => {
            // Fire-and-forget: the event is lost, the response is not.
            tracing::warn!(request_id = %request_id, "failed to enqueue query event: {}", e);
        }
    }

    let results = state
        .variants
        .variants_by_gene(&gene)
        .await
        .map_err(|e| {
            tracing::error!(gene = %gene, "variant lookup failed: {}", e);
            error_reply(ServiceError::Store(e))
        })?;

    Ok(Json(VariantsResponse {
        request_id,
        results,
    }))
}
