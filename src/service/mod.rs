//! HTTP service for the variant query API
//!
//! Exposes the three endpoints of the system: `/variants` (gene query plus
//! fire-and-forget audit enqueue), `/status/{request_id}` (audit event
//! lookup) and `/health` (liveness). Route registration and CORS live in
//! `server`; each endpoint has its own handler module.

pub mod handlers;
pub mod server;
pub mod types;

pub use server::{create_app, AppState};
pub use types::*;
