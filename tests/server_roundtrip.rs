//! Live Server Round-Trip
//!
//! Binds the router to an ephemeral port and drives it over real HTTP.

use std::sync::Arc;

use policy_cache::{api::create_router, AppState, Config, MemoryDataSource};
use serde_json::{json, Value};
use tokio::net::TcpListener;

async fn spawn_server() -> String {
    let source = Arc::new(MemoryDataSource::<String, String>::new());
    let state = AppState::from_config(&Config::default(), source).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, create_router(state)).await.unwrap();
    });

    format!("http://{}", addr)
}

#[tokio::test]
async fn test_set_get_delete_over_http() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let response = client
        .put(format!("{}/set", base))
        .json(&json!({ "key": "greeting", "value": "hello" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let body: Value = client
        .get(format!("{}/get/greeting", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["value"], "hello");

    let response = client
        .delete(format!("{}/del/greeting", base))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let response = client
        .get(format!("{}/get/greeting", base))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_stats_and_health_over_http() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let health: Value = client
        .get(format!("{}/health", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "healthy");

    let response = client.post(format!("{}/clear", base)).send().await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let stats: Value = client
        .get(format!("{}/stats", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stats["total_entries"], 0);
    assert_eq!(stats["max_size"], 1000);
}
