//! Redis list backend for the job queue
//!
//! Jobs are JSON payloads LPUSHed onto a well-known list; the worker
//! BRPOPs them, so delivery is FIFO across processes. The connection is
//! established lazily and re-established after an error, which keeps a
//! broker outage from taking the HTTP service down with it: enqueues fail,
//! get logged, and the responses still go out.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tokio::sync::Mutex;

use crate::queue::{EnqueueAck, JobQueue, QueueError};
use crate::service::types::QueryEvent;
use crate::worker::WorkerAck;

/// List the query-event jobs travel through
pub const QUEUE_KEY: &str = "mutation_browser:query_events";

/// List worker acks are pushed to when a redis result backend is configured
pub const RESULT_KEY: &str = "mutation_browser:results";

/// Latency bound on queue acceptance, so one request's broker stall cannot
/// hold its HTTP response
const ENQUEUE_TIMEOUT: Duration = Duration::from_secs(2);

/// Redis-backed job queue
pub struct RedisQueue {
    client: redis::Client,
    result_client: Option<redis::Client>,
    conn: Mutex<Option<MultiplexedConnection>>,
}

impl RedisQueue {
    /// Create a queue over the broker URL. Only parses the URLs; the
    /// first operation establishes the connection.
    pub fn new(broker_url: &str, result_backend: &str) -> Result<Self, QueueError> {
        let client = redis::Client::open(broker_url)
            .map_err(|e| QueueError::Broker(format!("invalid broker URL: {}", e)))?;

        let result_client = if result_backend.starts_with("redis://") {
            Some(
                redis::Client::open(result_backend)
                    .map_err(|e| QueueError::Broker(format!("invalid result backend: {}", e)))?,
            )
        } else {
            None
        };

        Ok(Self {
            client,
            result_client,
            conn: Mutex::new(None),
        })
    }

    /// Reuse the cached connection or establish a fresh one
    async fn conn(&self) -> Result<MultiplexedConnection, QueueError> {
        let mut guard = self.conn.lock().await;
        if let Some(conn) = guard.as_ref() {
            return Ok(conn.clone());
        }
        let conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| QueueError::Broker(e.to_string()))?;
        *guard = Some(conn.clone());
        Ok(conn)
    }

    /// Drop the cached connection after an error so the next operation
    /// reconnects
    async fn invalidate(&self) {
        *self.conn.lock().await = None;
    }

    /// Round-trip to the broker, for the `check` command
    pub async fn ping(&self) -> Result<(), QueueError> {
        let mut conn = self.conn().await?;
        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| QueueError::Broker(e.to_string()))?;
        if pong == "PONG" {
            Ok(())
        } else {
            Err(QueueError::Broker(format!("unexpected PING reply: {}", pong)))
        }
    }
}

#[async_trait]
impl JobQueue for RedisQueue {
    async fn enqueue(&self, job: &QueryEvent) -> Result<EnqueueAck, QueueError> {
        let payload = serde_json::to_string(job)?;

        let push = async {
            let mut conn = self.conn().await?;
            let _: i64 = conn
                .lpush(QUEUE_KEY, &payload)
                .await
                .map_err(|e| QueueError::Broker(e.to_string()))?;
            Ok::<_, QueueError>(())
        };

        match tokio::time::timeout(ENQUEUE_TIMEOUT, push).await {
            Ok(Ok(())) => Ok(EnqueueAck {
                message_id: job.request_id.clone(),
            }),
            Ok(Err(e)) => {
                self.invalidate().await;
                Err(e)
            }
            Err(_) => {
                self.invalidate().await;
                Err(QueueError::Timeout)
            }
        }
    }

    async fn dequeue(&self, wait: Duration) -> Result<Option<QueryEvent>, QueueError> {
        let mut conn = self.conn().await?;
        let reply: Result<Option<(String, String)>, _> =
            conn.brpop(QUEUE_KEY, wait.as_secs_f64()).await;

        match reply {
            Ok(Some((_, payload))) => Ok(Some(serde_json::from_str(&payload)?)),
            Ok(None) => Ok(None),
            Err(e) => {
                self.invalidate().await;
                Err(QueueError::Broker(e.to_string()))
            }
        }
    }

    async fn report_ack(&self, ack: &WorkerAck) -> Result<(), QueueError> {
        match &self.result_client {
            Some(client) => {
                let payload = serde_json::to_string(ack)?;
                let mut conn = client
                    .get_multiplexed_async_connection()
                    .await
                    .map_err(|e| QueueError::Broker(e.to_string()))?;
                let _: i64 = conn
                    .lpush(RESULT_KEY, &payload)
                    .await
                    .map_err(|e| QueueError::Broker(e.to_string()))?;
                Ok(())
            }
            None => {
                tracing::debug!(request_id = %ack.request_id, status = %ack.status, "worker ack");
                Ok(())
            }
        }
    }
}
