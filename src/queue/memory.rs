//! In-process queue backend over a tokio mpsc channel
//!
//! Used when the broker URL is `memory://`: the worker runs as a task in
//! the serve process and jobs never leave it. Also the backend the
//! integration tests run against.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::sync::Mutex;

use crate::queue::{EnqueueAck, JobQueue, QueueError};
use crate::service::types::QueryEvent;
use crate::worker::WorkerAck;

/// Unbounded in-process job queue
pub struct MemoryQueue {
    tx: mpsc::UnboundedSender<QueryEvent>,
    rx: Mutex<mpsc::UnboundedReceiver<QueryEvent>>,
}

impl MemoryQueue {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx: Mutex::new(rx),
        }
    }
}

impl Default for MemoryQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl JobQueue for MemoryQueue {
    async fn enqueue(&self, job: &QueryEvent) -> Result<EnqueueAck, QueueError> {
        self.tx
            .send(job.clone())
            .map_err(|_| QueueError::Closed)?;
        Ok(EnqueueAck {
            message_id: job.request_id.clone(),
        })
    }

    async fn dequeue(&self, wait: Duration) -> Result<Option<QueryEvent>, QueueError> {
        let mut rx = self.rx.lock().await;
        match tokio::time::timeout(wait, rx.recv()).await {
            Ok(Some(job)) => Ok(Some(job)),
            Ok(None) => Err(QueueError::Closed),
            Err(_) => Ok(None),
        }
    }

    async fn report_ack(&self, ack: &WorkerAck) -> Result<(), QueueError> {
        // No result channel in-process; the log line is the record.
        tracing::debug!(request_id = %ack.request_id, status = %ack.status, "worker ack");
        Ok(())
    }
}
