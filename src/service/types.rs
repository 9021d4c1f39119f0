//! Request and response types for the variant query service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::StoreError;

/// Status value written for every recorded query event. It is the only
/// state an event can be in; there are no transitions.
pub const STATUS_RECEIVED: &str = "received";

/// A row of the externally populated `variants` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Variant {
    /// Sample identifier the variant was observed in
    pub sample_id: String,
    /// Gene symbol (queries match this field exactly, case-sensitive)
    pub gene: String,
    /// Variant description, e.g. protein-change notation
    pub variant: String,
    /// Variant allele fraction in [0, 1]
    pub vaf: f64,
    /// Tumor type of the sample
    pub tumor_type: String,
}

/// Audit event recorded for each `/variants` query
///
/// Minted by the query handler, carried through the queue as JSON, and
/// written once by the worker. Never updated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct QueryEvent {
    /// Unique request identifier (UUID v4, generated at request time)
    pub request_id: String,
    /// Gene symbol that was queried
    pub gene: String,
    /// UTC time the request was received
    pub requested_at: DateTime<Utc>,
    /// Event status; this system only ever writes `"received"`
    pub status: String,
}

impl QueryEvent {
    /// Build the event recorded for a freshly received query
    pub fn received(request_id: String, gene: String, requested_at: DateTime<Utc>) -> Self {
        Self {
            request_id,
            gene,
            requested_at,
            status: STATUS_RECEIVED.to_string(),
        }
    }
}

/// Response body for `/health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always "ok"
    pub status: String,
}

/// Response body for `/variants`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantsResponse {
    /// Request identifier correlating this response with its audit event
    pub request_id: String,
    /// All variant rows matching the queried gene (may be empty)
    pub results: Vec<Variant>,
}

/// Error response body, `{"error": "<message>"}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Service-level errors surfaced to HTTP callers
#[derive(thiserror::Error, Debug)]
pub enum ServiceError {
    #[error("gene parameter is required")]
    MissingGene,

    #[error("request_id not found")]
    RequestIdNotFound,

    #[error("backing store unavailable: {0}")]
    Store(#[from] StoreError),

    #[error("configuration error: {0}")]
    Config(String),
}

impl ServiceError {
    /// Convert to HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::MissingGene => 400,
            ServiceError::RequestIdNotFound => 404,
            ServiceError::Store(_) => 503,
            ServiceError::Config(_) => 500,
        }
    }

    /// Convert to error response body
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.to_string(),
        }
    }
}
