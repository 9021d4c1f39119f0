//! PostgreSQL-backed variant and event stores
//!
//! One lazily connected pool serves both tables. Connections are acquired
//! per query and released on every exit path by the pool guard; the
//! acquire timeout bounds how long a request can wait on a dead database.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};

use crate::config::DatabaseConfig;
use crate::service::types::{QueryEvent, Variant};
use crate::store::{EventStore, StoreError, VariantStore};

/// Pooled PostgreSQL store for both `variants` and `query_events`
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a store over a lazily connected pool. No round-trip happens
    /// here; the first query establishes the connection.
    pub fn connect(config: &DatabaseConfig) -> Self {
        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.name);

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds))
            .connect_lazy_with(options);

        Self { pool }
    }

    /// Round-trip to the database, for the `check` command
    pub async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl VariantStore for PgStore {
    async fn variants_by_gene(&self, gene: &str) -> Result<Vec<Variant>, StoreError> {
        let rows = sqlx::query_as::<_, Variant>(
            "SELECT sample_id, gene, variant, vaf, tumor_type \
             FROM variants WHERE gene = $1",
        )
        .bind(gene)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

#[async_trait]
impl EventStore for PgStore {
    async fn insert_event(&self, event: &QueryEvent) -> Result<(), StoreError> {
        // ON CONFLICT DO NOTHING keeps redelivered jobs from failing the
        // worker; the first write wins.
        sqlx::query(
            "INSERT INTO query_events (request_id, gene, requested_at, status) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (request_id) DO NOTHING",
        )
        .bind(&event.request_id)
        .bind(&event.gene)
        .bind(event.requested_at)
        .bind(&event.status)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn event_by_request_id(
        &self,
        request_id: &str,
    ) -> Result<Option<QueryEvent>, StoreError> {
        let event = sqlx::query_as::<_, QueryEvent>(
            "SELECT request_id, gene, requested_at, status \
             FROM query_events WHERE request_id = $1",
        )
        .bind(request_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }
}
