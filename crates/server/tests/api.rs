//! End-to-end tests for the HTTP API, driven through the router without
//! binding a socket.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use matcher::DuplicateMatcher;
use semantic::{EmbeddingProvider, EmbeddingVector, SemanticError, StubEmbedder};
use serde_json::{json, Value};
use server::{build_router, ComplaintStore, InMemoryStore, ServerConfig, ServerState};
use tower::ServiceExt;

struct QuotaExhausted;

#[async_trait]
impl EmbeddingProvider for QuotaExhausted {
    async fn embed(&self, _text: &str) -> Result<EmbeddingVector, SemanticError> {
        Err(SemanticError::QuotaExceeded("daily quota used up".into()))
    }

    fn model_name(&self) -> &str {
        "quota-exhausted"
    }
}

fn app_with(provider: Arc<dyn EmbeddingProvider>) -> (Router, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::new());
    let state = ServerState::with_components(
        ServerConfig::default(),
        Arc::new(DuplicateMatcher::with_defaults(provider)),
        store.clone(),
    );
    (build_router(Arc::new(state)), store)
}

fn app() -> (Router, Arc<InMemoryStore>) {
    app_with(Arc::new(StubEmbedder::new(256)))
}

fn pothole() -> Value {
    json!({
        "title": "Large pothole near bus stop",
        "description": "A deep pothole has formed right in front of the bus stop and vehicles keep swerving around it.",
        "category": "Roads",
        "location": "Sector 14 Main Road",
        "priority": "high"
    })
}

fn water_outage() -> Value {
    json!({
        "title": "No water supply since Monday",
        "description": "Taps in the entire block have been dry for three days and tankers have not arrived.",
        "category": "Water Supply",
        "location": "Rajiv Nagar Block C"
    })
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn submit(app: &Router, body: &Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/complaints/submit")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

#[tokio::test]
async fn first_submission_is_registered() {
    let (app, store) = app();

    let (status, body) = submit(&app, &pothole()).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["is_duplicate"], false);
    assert_eq!(body["message"], "Complaint registered successfully.");
    assert!(body.get("duplicate_match").is_none());
    assert_eq!(body["complaint"]["status"], "registered");
    assert_eq!(body["complaint"]["priority"], "high");
    assert!(body["complaint"]["reference_id"]
        .as_str()
        .unwrap()
        .starts_with("GRV-"));
    assert_eq!(store.complaint_count().await, 1);
}

#[tokio::test]
async fn resubmission_is_rejected_as_duplicate() {
    let (app, store) = app();
    let (_, first) = submit(&app, &pothole()).await;

    let (status, body) = submit(&app, &pothole()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_duplicate"], true);
    assert_eq!(
        body["message"],
        "A similar complaint already exists in the system."
    );
    assert!(body.get("complaint").is_none());

    let found = &body["duplicate_match"];
    assert_eq!(found["reference_id"], first["complaint"]["reference_id"]);
    assert!(found["similarity_score"].as_f64().unwrap() > 99.0);
    assert_eq!(found["factor_scores"]["category_match"], 100.0);
    assert_eq!(found["factor_scores"]["location_match"], 100.0);
    assert!(found["reasoning"]
        .as_str()
        .unwrap()
        .contains("highly similar"));

    assert_eq!(store.complaint_count().await, 1);
    let links = store.duplicate_links().await;
    assert_eq!(links.len(), 1);
    assert_eq!(
        links[0].original_complaint_id.to_string(),
        first["complaint"]["id"].as_str().unwrap()
    );
}

#[tokio::test]
async fn unrelated_complaint_is_registered_alongside() {
    let (app, store) = app();
    submit(&app, &pothole()).await;

    let (status, body) = submit(&app, &water_outage()).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["is_duplicate"], false);
    assert_eq!(body["complaint"]["priority"], "medium");
    assert_eq!(store.complaint_count().await, 2);
    assert!(store.duplicate_links().await.is_empty());
}

#[tokio::test]
async fn invalid_submission_is_a_bad_request() {
    let (app, store) = app();
    let mut body = pothole();
    body["description"] = json!("Too short");

    let (status, body) = submit(&app, &body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
    assert_eq!(store.complaint_count().await, 0);
}

#[tokio::test]
async fn provider_outage_is_service_unavailable() {
    let (app, store) = app_with(Arc::new(QuotaExhausted));

    let (status, body) = submit(&app, &pothole()).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["code"], "EMBEDDING_UNAVAILABLE");
    assert_eq!(store.complaint_count().await, 0);
}

#[tokio::test]
async fn track_finds_complaint_case_insensitively() {
    let (app, _) = app();
    let (_, created) = submit(&app, &pothole()).await;
    let reference_id = created["complaint"]["reference_id"].as_str().unwrap();

    let uri = format!(
        "/api/v1/complaints/track/{}",
        reference_id.to_ascii_lowercase()
    );
    let (status, body) = get(&app, &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reference_id"], reference_id);
    assert_eq!(body["title"], "Large pothole near bus stop");
    assert!(body.get("embedding").is_none());
}

#[tokio::test]
async fn track_unknown_reference_is_not_found() {
    let (app, _) = app();

    let (status, body) = get(&app, "/api/v1/complaints/track/GRV-2025-00000").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn health_and_readiness() {
    let (app, _) = app();
    submit(&app, &pothole()).await;

    let (status, health) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["service"], "grievance-server");

    let (status, ready) = get(&app, "/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ready["complaints"], 1);
    assert_eq!(ready["components"]["embedding_model"], "stub-bow");

    let (status, metadata) = get(&app, "/api/v1/metadata").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(metadata["duplicate_threshold"], 0.75);
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let (app, _) = app();
    let (status, body) = get(&app, "/api/v1/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn request_id_is_echoed() {
    let (app, _) = app();
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "req-42")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.headers()["x-request-id"], "req-42");
}

#[tokio::test]
async fn request_id_is_generated_when_absent() {
    let (app, _) = app();
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

    let response = app.oneshot(request).await.unwrap();

    let id = response.headers()["x-request-id"].to_str().unwrap();
    assert!(uuid::Uuid::parse_str(id).is_ok());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_identical_submissions_register_once() {
    let (app, store) = app();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let app = app.clone();
            tokio::spawn(async move { submit(&app, &pothole()).await })
        })
        .collect();

    let mut statuses = Vec::new();
    for handle in handles {
        let (status, _) = handle.await.unwrap();
        statuses.push(status);
    }

    let created = statuses.iter().filter(|s| **s == StatusCode::CREATED).count();
    let duplicates = statuses.iter().filter(|s| **s == StatusCode::OK).count();
    assert_eq!(created, 1);
    assert_eq!(duplicates, 3);
    assert_eq!(store.complaint_count().await, 1);
    assert_eq!(store.duplicate_links().await.len(), 3);
}
