use axum::{extract::State, routing::put, Json, Router};
use scenebridge_control::{LedFxClient, LedFxError};
use scenebridge_core::SceneTrigger;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

type RequestLog = Arc<Mutex<Vec<Value>>>;

async fn record_scene(State(log): State<RequestLog>, Json(body): Json<Value>) -> Json<Value> {
    log.lock().unwrap().push(body);
    Json(json!({"status": "success"}))
}

async fn list_scenes() -> Json<Value> {
    Json(json!({
        "status": "success",
        "scenes": {
            "strobe": {"name": "Strobe"},
            "baseocean": {"name": "Base Ocean"},
            "orangehigh": {"name": "Orange High"}
        }
    }))
}

async fn spawn_ledfx(log: RequestLog) -> SocketAddr {
    let app = Router::new()
        .route("/api/scenes", put(record_scene).get(list_scenes))
        .with_state(log);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

#[tokio::test]
async fn test_set_scene_sends_put_body() {
    let log = RequestLog::default();
    let addr = spawn_ledfx(log.clone()).await;
    let client = LedFxClient::new(&format!("http://{}", addr)).unwrap();

    client
        .set_scene(&SceneTrigger::activate("baseocean"))
        .await
        .unwrap();
    client
        .set_scene(&SceneTrigger::deactivate("baseocean"))
        .await
        .unwrap();

    let requests = log.lock().unwrap().clone();
    assert_eq!(
        requests,
        vec![
            json!({"id": "baseocean", "action": "activate"}),
            json!({"id": "baseocean", "action": "deactivate"}),
        ]
    );
}

#[tokio::test]
async fn test_list_scenes_sorted() {
    let addr = spawn_ledfx(RequestLog::default()).await;
    let client = LedFxClient::new(&format!("http://{}/", addr)).unwrap();

    let scenes = client.list_scenes().await.unwrap();
    assert_eq!(scenes, vec!["baseocean", "orangehigh", "strobe"]);
}

#[tokio::test]
async fn test_http_error_status() {
    let app = Router::new();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = LedFxClient::new(&format!("http://{}", addr)).unwrap();
    let err = client
        .set_scene(&SceneTrigger::activate("baseocean"))
        .await
        .unwrap_err();
    assert!(matches!(err, LedFxError::ApiError(_)));
}

#[tokio::test]
async fn test_dispatch_delivers_in_background() {
    let log = RequestLog::default();
    let addr = spawn_ledfx(log.clone()).await;
    let client = LedFxClient::new(&format!("http://{}", addr)).unwrap();

    client
        .dispatch(SceneTrigger::activate("orangehigh"))
        .await
        .unwrap();

    assert_eq!(log.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_dispatch_swallows_network_failure() {
    // Nothing listens on the discard port
    let client = LedFxClient::new("http://127.0.0.1:9").unwrap();
    let handle = client.dispatch(SceneTrigger::activate("baseocean"));
    assert!(handle.await.is_ok());
}
