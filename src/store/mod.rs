//! Variant and event stores
//!
//! The query service reads variants and the worker writes query events
//! through these traits, so the HTTP layer never knows which backend it is
//! talking to. `PgStore` is the production backend; `MemoryStore` backs
//! the integration tests and the `memory://` development mode.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::service::types::{QueryEvent, Variant};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Errors from the backing stores
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    /// Query or connection failure against the database
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Store cannot be reached or configured
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Read access to the externally populated `variants` table
#[async_trait]
pub trait VariantStore: Send + Sync {
    /// All rows whose gene matches exactly (case-sensitive). An empty
    /// result is not an error.
    async fn variants_by_gene(&self, gene: &str) -> Result<Vec<Variant>, StoreError>;
}

/// Durable store of query events, keyed by request identifier
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Record an event. A duplicate `request_id` is silently ignored so
    /// the worker stays safe under at-least-once redelivery.
    async fn insert_event(&self, event: &QueryEvent) -> Result<(), StoreError>;

    /// Look up a single event by request identifier
    async fn event_by_request_id(
        &self,
        request_id: &str,
    ) -> Result<Option<QueryEvent>, StoreError>;
}
