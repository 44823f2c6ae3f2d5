#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use bounce_api::config::ServerConfig;
use bounce_api::router::build_app_router;
use bounce_api::state::AppState;
use bounce_store::{LocalCacheStore, RecordStore, SnapshotCache};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
    }
}

/// Build the full application router around `store` with an in-memory
/// snapshot cache, mirroring `main.rs`.
pub fn build_test_app(store: Arc<dyn RecordStore>) -> Router {
    build_app_router(AppState {
        store,
        cache: Arc::new(SnapshotCache::in_memory()),
        config: Arc::new(test_config()),
    })
}

/// A router over a local cache store in a fresh temporary directory.
///
/// Keep the returned `TempDir` alive for the duration of the test.
pub fn local_app() -> (Router, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(LocalCacheStore::new(dir.path().join("checks.json")));
    (build_test_app(store), dir)
}

/// A create body that passes validation.
pub fn valid_check() -> Value {
    json!({
        "date": "2025-01-01",
        "checkNumber": "CHK-100",
        "amount": 1500,
        "name": "Layla Hassan",
        "building": "Tower A",
        "unitNumber": "4B",
        "status": "bounced",
        "email": "layla@example.com",
        "phone": "+20 100 555 0101"
    })
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn post_empty(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::POST, uri, None).await
}

pub async fn put_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(body)).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None).await
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Create a check and return its id.
pub async fn create_check(app: &Router, body: Value) -> String {
    let response = post_json(app.clone(), "/checks", body).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["id"].as_str().unwrap().to_string()
}
