//! In-memory variant and event stores
//!
//! Backs the integration tests and the `memory://` development mode with
//! the same semantics as the PostgreSQL stores, including first-write-wins
//! on duplicate request identifiers.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::service::types::{QueryEvent, Variant};
use crate::store::{EventStore, StoreError, VariantStore};

/// In-memory store for both variants and query events
#[derive(Default)]
pub struct MemoryStore {
    variants: RwLock<Vec<Variant>>,
    events: RwLock<HashMap<String, QueryEvent>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed variant rows, replacing nothing; rows accumulate like inserts
    pub async fn seed_variants(&self, rows: Vec<Variant>) {
        self.variants.write().await.extend(rows);
    }

    /// Number of recorded events, for tests
    pub async fn event_count(&self) -> usize {
        self.events.read().await.len()
    }
}

#[async_trait]
impl VariantStore for MemoryStore {
    async fn variants_by_gene(&self, gene: &str) -> Result<Vec<Variant>, StoreError> {
        let rows = self
            .variants
            .read()
            .await
            .iter()
            .filter(|v| v.gene == gene)
            .cloned()
            .collect();
        Ok(rows)
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn insert_event(&self, event: &QueryEvent) -> Result<(), StoreError> {
        self.events
            .write()
            .await
            .entry(event.request_id.clone())
            .or_insert_with(|| event.clone());
        Ok(())
    }

    async fn event_by_request_id(
        &self,
        request_id: &str,
    ) -> Result<Option<QueryEvent>, StoreError> {
        Ok(self.events.read().await.get(request_id).cloned())
    }
}
