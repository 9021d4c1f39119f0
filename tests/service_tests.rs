//! End-to-end tests of the HTTP surface over the in-memory backends
//!
//! The full router is exercised through `tower::ServiceExt::oneshot`, with
//! the worker spawned the same way the serve command spawns it for the
//! memory broker, so the async logging path runs for real.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use mutation_browser::config::ServiceConfig;
use mutation_browser::queue::MemoryQueue;
use mutation_browser::service::server::{create_app, AppState};
use mutation_browser::store::MemoryStore;
use mutation_browser::{worker, Variant};

struct TestHarness {
    app: Router,
    store: Arc<MemoryStore>,
}

async fn harness(seed: Vec<Variant>) -> TestHarness {
    let store = Arc::new(MemoryStore::new());
    store.seed_variants(seed).await;

    let queue = Arc::new(MemoryQueue::new());
    worker::spawn(queue.clone(), store.clone());

    let mut config = ServiceConfig::default();
    config.queue.broker_url = "memory://".to_string();

    let state = AppState {
        variants: store.clone(),
        events: store.clone(),
        queue,
        config: Arc::new(config),
    };

    TestHarness {
        app: create_app(state),
        store,
    }
}

fn tp53_row() -> Variant {
    Variant {
        sample_id: "S1".to_string(),
        gene: "TP53".to_string(),
        variant: "p.V157E".to_string(),
        vaf: 0.42,
        tumor_type: "lung".to_string(),
    }
}

async fn get(app: &Router, path: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(path)
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let json = serde_json::from_slice(&bytes).expect("json body");
    (status, json)
}

/// Poll `/status/{request_id}` until the asynchronous write lands
async fn wait_for_status(app: &Router, request_id: &str) -> (StatusCode, Value) {
    for _ in 0..100 {
        let (status, body) = get(app, &format!("/status/{}", request_id)).await;
        if status == StatusCode::OK {
            return (status, body);
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    get(app, &format!("/status/{}", request_id)).await
}

#[tokio::test]
async fn health_returns_exact_body() {
    let h = harness(vec![]).await;
    let (status, body) = get(&h.app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({"status": "ok"}));
}

#[tokio::test]
async fn variants_without_gene_is_400() {
    let h = harness(vec![tp53_row()]).await;
    let (status, body) = get(&h.app, "/variants").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "gene parameter is required");
}

#[tokio::test]
async fn variants_with_empty_gene_is_400() {
    let h = harness(vec![tp53_row()]).await;
    let (status, body) = get(&h.app, "/variants?gene=").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "gene parameter is required");
}

#[tokio::test]
async fn variants_returns_seeded_rows_for_gene() {
    let mut other = tp53_row();
    other.sample_id = "S2".to_string();
    other.gene = "BRCA1".to_string();
    let h = harness(vec![tp53_row(), other]).await;

    let (status, body) = get(&h.app, "/variants?gene=TP53").await;
    assert_eq!(status, StatusCode::OK);

    let results = body["results"].as_array().expect("results array");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["sample_id"], "S1");
    assert_eq!(results[0]["gene"], "TP53");
    assert_eq!(results[0]["variant"], "p.V157E");
    assert_eq!(results[0]["vaf"], 0.42);
    assert_eq!(results[0]["tumor_type"], "lung");

    // request_id must be a syntactically valid UUID
    let request_id = body["request_id"].as_str().expect("request_id");
    assert!(uuid::Uuid::parse_str(request_id).is_ok());
}

#[tokio::test]
async fn variants_with_unknown_gene_is_200_and_empty() {
    let h = harness(vec![tp53_row()]).await;
    let (status, body) = get(&h.app, "/variants?gene=NOPE").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"], serde_json::json!([]));
    assert!(body["request_id"].as_str().is_some());
}

#[tokio::test]
async fn repeated_queries_mint_independent_request_ids() {
    let h = harness(vec![tp53_row()]).await;
    let (_, first) = get(&h.app, "/variants?gene=TP53").await;
    let (_, second) = get(&h.app, "/variants?gene=TP53").await;
    assert_ne!(first["request_id"], second["request_id"]);
    assert_eq!(first["results"], second["results"]);
}

#[tokio::test]
async fn status_for_unknown_request_id_is_404() {
    let h = harness(vec![]).await;
    let (status, body) = get(&h.app, "/status/never-issued").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "request_id not found");
}

#[tokio::test]
async fn query_event_becomes_visible_via_status() {
    let h = harness(vec![tp53_row()]).await;

    let (status, body) = get(&h.app, "/variants?gene=TP53").await;
    assert_eq!(status, StatusCode::OK);
    let request_id = body["request_id"].as_str().expect("request_id").to_string();

    let (status, event) = wait_for_status(&h.app, &request_id).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(event["request_id"], request_id.as_str());
    assert_eq!(event["gene"], "TP53");
    assert_eq!(event["status"], "received");

    // requested_at comes back as an ISO-8601 UTC timestamp
    let requested_at = event["requested_at"].as_str().expect("requested_at");
    assert!(requested_at.parse::<chrono::DateTime<chrono::Utc>>().is_ok());
}

#[tokio::test]
async fn each_query_records_exactly_one_event() {
    let h = harness(vec![tp53_row()]).await;

    let (_, first) = get(&h.app, "/variants?gene=TP53").await;
    let (_, second) = get(&h.app, "/variants?gene=BRCA1").await;

    for body in [&first, &second] {
        let request_id = body["request_id"].as_str().expect("request_id");
        let (status, _) = wait_for_status(&h.app, request_id).await;
        assert_eq!(status, StatusCode::OK);
    }
    assert_eq!(h.store.event_count().await, 2);
}

#[tokio::test]
async fn unknown_route_is_json_404() {
    let h = harness(vec![]).await;
    let (status, body) = get(&h.app, "/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "endpoint not found");
}

#[tokio::test]
async fn responses_carry_permissive_cors_headers() {
    let h = harness(vec![]).await;
    let response = h
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("origin", "http://localhost:3000")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}

#[tokio::test]
async fn preflight_is_answered_with_204() {
    let h = harness(vec![]).await;
    let response = h
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/variants")
                .header("origin", "http://localhost:3000")
                .header("access-control-request-method", "GET")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-methods")
            .and_then(|v| v.to_str().ok()),
        Some("GET,OPTIONS")
    );
}
