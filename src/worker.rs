//! Async task worker for the audit logging pipeline
//!
//! Consumes query-event jobs from the queue and records each one in the
//! event store. The worker is the sole writer of `query_events`: the
//! query handler only ever enqueues. A redelivered job is harmless because
//! the store ignores duplicate request identifiers.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::queue::JobQueue;
use crate::service::types::QueryEvent;
use crate::store::{EventStore, StoreError};

/// How long a single dequeue waits before looping
const DEQUEUE_WAIT: Duration = Duration::from_secs(5);

/// Pause after a dequeue error before retrying, so a dead broker does not
/// spin the loop
const ERROR_BACKOFF: Duration = Duration::from_secs(1);

/// Status object the worker hands back to the queue transport after a job
/// is recorded. Nothing in this system consumes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerAck {
    /// Always "logged"
    pub status: String,
    /// Request identifier of the recorded event
    pub request_id: String,
}

/// Record a single job in the event store
///
/// Duplicate request identifiers are silently ignored by the store, so
/// processing is idempotent under at-least-once delivery; the ack is
/// returned either way.
pub async fn process_job(
    events: &dyn EventStore,
    job: &QueryEvent,
) -> Result<WorkerAck, StoreError> {
    events.insert_event(job).await?;
    Ok(WorkerAck {
        status: "logged".to_string(),
        request_id: job.request_id.clone(),
    })
}

/// Consume jobs until the process exits
///
/// A failed insert is logged and the job dropped; there is no retry
/// policy beyond what the transport itself provides.
pub async fn run(queue: Arc<dyn JobQueue>, events: Arc<dyn EventStore>) {
    info!("query-event worker started");

    loop {
        match queue.dequeue(DEQUEUE_WAIT).await {
            Ok(Some(job)) => match process_job(events.as_ref(), &job).await {
                Ok(ack) => {
                    if let Err(e) = queue.report_ack(&ack).await {
                        warn!(request_id = %ack.request_id, "failed to report worker ack: {}", e);
                    }
                }
                Err(e) => {
                    error!(request_id = %job.request_id, "failed to record query event: {}", e);
                }
            },
            Ok(None) => {}
            Err(e) => {
                warn!("dequeue failed: {}", e);
                tokio::time::sleep(ERROR_BACKOFF).await;
            }
        }
    }
}

/// Spawn the worker as a background task in the current runtime
pub fn spawn(queue: Arc<dyn JobQueue>, events: Arc<dyn EventStore>) -> JoinHandle<()> {
    tokio::spawn(run(queue, events))
}
