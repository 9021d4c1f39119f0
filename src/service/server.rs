//! Router setup for the variant query service

use std::sync::Arc;

use axum::{
    extract::Request,
    http::{HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};

use crate::config::ServiceConfig;
use crate::queue::JobQueue;
use crate::service::handlers;
use crate::service::types::ErrorResponse;
use crate::store::{EventStore, VariantStore};

/// Application state shared across handlers
///
/// Stores and queue are held behind trait objects so the same router runs
/// over PostgreSQL/redis in production and over the in-memory backends in
/// tests.
#[derive(Clone)]
pub struct AppState {
    /// Read access to the variants table
    pub variants: Arc<dyn VariantStore>,
    /// Read access to recorded query events (the worker writes them)
    pub events: Arc<dyn EventStore>,
    /// Queue transport for logging jobs
    pub queue: Arc<dyn JobQueue>,
    /// Service configuration, constructed once at startup
    pub config: Arc<ServiceConfig>,
}

/// Create the axum application with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    let enable_cors = state.config.server.enable_cors;

    let mut app = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/variants", get(handlers::variants::query_variants))
        .route("/status/:request_id", get(handlers::status::query_status))
        .fallback(handle_404)
        .with_state(state);

    if enable_cors {
        app = app.layer(middleware::from_fn(cors_middleware));
    }

    app
}

/// Handle 404s for unknown routes
async fn handle_404() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "endpoint not found".to_string(),
        }),
    )
}

/// Permissive CORS, matching the original browser-facing deployment:
/// every origin may read, preflights are answered with 204.
async fn cors_middleware(req: Request, next: Next) -> Response {
    if req.method() == Method::OPTIONS {
        let mut resp = StatusCode::NO_CONTENT.into_response();
        let headers = resp.headers_mut();
        headers.insert("access-control-allow-origin", HeaderValue::from_static("*"));
        headers.insert(
            "access-control-allow-methods",
            HeaderValue::from_static("GET,OPTIONS"),
        );
        headers.insert(
            "access-control-allow-headers",
            HeaderValue::from_static("content-type"),
        );
        return resp;
    }

    let mut resp = next.run(req).await;
    resp.headers_mut()
        .insert("access-control-allow-origin", HeaderValue::from_static("*"));
    resp
}
