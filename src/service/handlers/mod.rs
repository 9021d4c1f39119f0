//! HTTP endpoint handlers

pub mod health;
pub mod status;
pub mod variants;

use axum::{http::StatusCode, response::Json};

use crate::service::types::{ErrorResponse, ServiceError};

/// Map a service error onto the `(status, body)` pair handlers return
pub(crate) fn error_reply(error: ServiceError) -> (StatusCode, Json<ErrorResponse>) {
    let status = StatusCode::from_u16(error.status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(error.to_response()))
}
