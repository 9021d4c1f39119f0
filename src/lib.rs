//! mutation-browser: genomic variant query service with asynchronous
//! audit logging.
//!
//! The HTTP surface is three endpoints: `/variants` returns the variant
//! rows for a gene and mints a `request_id`, `/status/{request_id}` reads
//! back the audit event a background worker recorded for that request,
//! and `/health` is a liveness probe. The variant query and the audit
//! write are deliberately decoupled: the handler enqueues the logging job
//! fire-and-forget and never waits on the worker.

pub mod config;
pub mod queue;
pub mod service;
pub mod store;
pub mod worker;

pub use config::ServiceConfig;
pub use service::server::{create_app, AppState};
pub use service::types::{QueryEvent, Variant};
