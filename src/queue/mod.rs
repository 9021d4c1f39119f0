//! Job queue for the audit logging pipeline
//!
//! The query handler enqueues one logging job per request; the worker
//! dequeues them and writes to the event store. The trait keeps the
//! transport pluggable: a tokio mpsc backend for in-process use and a
//! redis list backend for a real cross-process broker.

pub mod memory;
pub mod redis_backend;

use std::time::Duration;

use async_trait::async_trait;

use crate::service::types::QueryEvent;
use crate::worker::WorkerAck;

pub use memory::MemoryQueue;
pub use redis_backend::RedisQueue;

/// Errors from the queue transport. The query handler treats every one of
/// these as non-fatal: a failed enqueue is logged and the HTTP response
/// goes out regardless.
#[derive(thiserror::Error, Debug)]
pub enum QueueError {
    /// Broker cannot be reached or refused the operation
    #[error("broker error: {0}")]
    Broker(String),

    /// Queue has been closed (memory backend only)
    #[error("queue closed")]
    Closed,

    /// Enqueue did not complete within its latency bound
    #[error("enqueue timed out")]
    Timeout,

    /// Job payload could not be (de)serialized
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Acknowledgement that the broker accepted a job
#[derive(Debug, Clone)]
pub struct EnqueueAck {
    /// Broker-side identifier of the accepted job
    pub message_id: String,
}

/// Queue transport for query-event logging jobs
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Submit a logging job. Returns as soon as the broker accepts it;
    /// never waits for the worker.
    async fn enqueue(&self, job: &QueryEvent) -> Result<EnqueueAck, QueueError>;

    /// Pull the next job, waiting up to `wait`. `Ok(None)` means the wait
    /// elapsed with nothing to do.
    async fn dequeue(&self, wait: Duration) -> Result<Option<QueryEvent>, QueueError>;

    /// Hand the worker's ack back to the transport's result channel. The
    /// ack has no consumer in this system; it exists for observability.
    async fn report_ack(&self, ack: &WorkerAck) -> Result<(), QueueError>;
}
