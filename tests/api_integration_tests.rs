//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each endpoint against an engine
//! backed by a `MemoryDataSource`.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::Response,
    Router,
};
use policy_cache::{
    api::create_router,
    cache::{CacheBuilder, EvictionStrategy, ReadPolicy, WritePolicy},
    AppState, MemoryDataSource,
};
use serde_json::Value;
use tower::ServiceExt;

type Source = MemoryDataSource<String, String>;

// == Helper Functions ==

fn create_test_app() -> (Router, Arc<Source>) {
    create_app_with(100, EvictionStrategy::Lru, ReadPolicy::ReadThrough)
}

fn create_app_with(
    max_size: usize,
    eviction: EvictionStrategy,
    read_policy: ReadPolicy,
) -> (Router, Arc<Source>) {
    let source = Arc::new(Source::new());
    let cache = CacheBuilder::<String, String>::new(max_size)
        .eviction(eviction)
        .read_policy(read_policy)
        .write_policy(WritePolicy::WriteAlways)
        .data_source(source.clone())
        .build()
        .unwrap();
    (create_router(AppState::new(cache)), source)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<&str>) -> Response {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

async fn set(app: &Router, key: &str, value: &str) -> Response {
    let body = serde_json::json!({ "key": key, "value": value }).to_string();
    send(app, "PUT", "/set", Some(&body)).await
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// == SET Endpoint Tests ==

#[tokio::test]
async fn test_set_endpoint_success() {
    let (app, source) = create_test_app();

    let response = set(&app, "test_key", "test_value").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert!(json["message"].as_str().unwrap().contains("test_key"));
    assert_eq!(
        source.value(&"test_key".to_string()).await,
        Some("test_value".to_string())
    );
}

#[tokio::test]
async fn test_set_endpoint_store_unavailable() {
    let (app, source) = create_test_app();
    source.set_failing(true);

    let response = set(&app, "k", "v").await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("unavailable"));
}

// == GET Endpoint Tests ==

#[tokio::test]
async fn test_get_endpoint_success() {
    let (app, _) = create_test_app();
    set(&app, "get_key", "get_value").await;

    let response = send(&app, "GET", "/get/get_key", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["key"], "get_key");
    assert_eq!(json["value"], "get_value");
}

#[tokio::test]
async fn test_get_endpoint_reads_through() {
    let (app, source) = create_test_app();
    source
        .seed("cold".to_string(), "from_store".to_string())
        .await;

    let response = send(&app, "GET", "/get/cold", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["value"], "from_store");
    assert_eq!(source.fetch_count(&"cold".to_string()).await, 1);
}

#[tokio::test]
async fn test_get_endpoint_not_found() {
    let (app, _) = create_test_app();

    let response = send(&app, "GET", "/get/nonexistent_key", None).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_to_json(response.into_body()).await;
    assert!(json.get("error").is_some());
}

// == DELETE Endpoint Tests ==

#[tokio::test]
async fn test_delete_endpoint_success() {
    let (app, source) = create_test_app();
    assert_eq!(set(&app, "delete_key", "delete_value").await.status(), StatusCode::OK);

    let del_response = send(&app, "DELETE", "/del/delete_key", None).await;
    assert_eq!(del_response.status(), StatusCode::OK);
    assert_eq!(source.value(&"delete_key".to_string()).await, None);

    let get_response = send(&app, "GET", "/get/delete_key", None).await;
    assert_eq!(get_response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_endpoint_absent_key_succeeds() {
    let (app, source) = create_test_app();

    let response = send(&app, "DELETE", "/del/nonexistent_key", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(source.delete_count(&"nonexistent_key".to_string()).await, 1);
}

// == CLEAR Endpoint Tests ==

#[tokio::test]
async fn test_clear_endpoint_keeps_store() {
    let (app, source) = create_app_with(10, EvictionStrategy::Lru, ReadPolicy::Simple);
    set(&app, "a", "1").await;
    set(&app, "b", "2").await;

    let response = send(&app, "POST", "/clear", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let get_response = send(&app, "GET", "/get/a", None).await;
    assert_eq!(get_response.status(), StatusCode::NOT_FOUND);
    assert_eq!(source.len().await, 2);
}

// == STATS Endpoint Tests ==

#[tokio::test]
async fn test_stats_endpoint() {
    let (app, _) = create_test_app();

    set(&app, "stats_key", "stats_value").await;
    // hit
    send(&app, "GET", "/get/stats_key", None).await;
    // miss
    send(&app, "GET", "/get/nonexistent", None).await;

    let response = send(&app, "GET", "/stats", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;

    assert_eq!(json["hits"].as_u64().unwrap(), 1);
    assert_eq!(json["misses"].as_u64().unwrap(), 1);
    assert_eq!(json["total_entries"].as_u64().unwrap(), 1);
    assert_eq!(json["eviction"], "LRU");
    assert_eq!(json["read_policy"], "ReadThrough");
    assert_eq!(json["write_policy"], "WriteAlways");
    assert!(json.get("hit_rate").is_some());
}

#[tokio::test]
async fn test_stats_counts_evictions() {
    let (app, _) = create_app_with(2, EvictionStrategy::Fifo, ReadPolicy::Simple);
    for key in ["a", "b", "c"] {
        set(&app, key, "v").await;
    }

    let response = send(&app, "GET", "/stats", None).await;
    let json = body_to_json(response.into_body()).await;

    assert_eq!(json["evictions"].as_u64().unwrap(), 1);
    assert_eq!(json["total_entries"].as_u64().unwrap(), 2);
    assert_eq!(json["max_size"].as_u64().unwrap(), 2);
}

// == HEALTH Endpoint Tests ==

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _) = create_test_app();

    let response = send(&app, "GET", "/health", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"].as_str().unwrap(), "healthy");
    assert!(json.get("timestamp").is_some());
}

// == Error Response Tests ==

#[tokio::test]
async fn test_invalid_json_request() {
    let (app, _) = create_test_app();

    let response = send(&app, "PUT", "/set", Some(r#"{"invalid json"#)).await;

    // Axum returns 400 or 422 for JSON parsing errors
    assert!(
        response.status() == StatusCode::BAD_REQUEST
            || response.status() == StatusCode::UNPROCESSABLE_ENTITY
    );
}

#[tokio::test]
async fn test_empty_key_request() {
    let (app, _) = create_test_app();

    let response = set(&app, "", "value").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("empty"));
}
