use super::*;
use crate::Config;
use crate::collector::test_helpers::{test_config, wait_for_terminal};
use crate::types::SessionId;
use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Request, StatusCode};
use serde_json::{Value, json};
use std::time::Duration;
use tower::ServiceExt;


/// Router plus the collector behind it, for driving sessions directly
fn create_test_app(config: Config) -> (Router, WeatherCollector) {
    let collector = WeatherCollector::new(config).unwrap();
    (create_router(collector.clone()), collector)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Bytes) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, body)
}

async fn send_json(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, _, body) = send(app, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_empty(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_api_server_binds_and_shuts_down() {
    let mut config = test_config();
    config.server.api.bind_address = "127.0.0.1:0".parse().unwrap(); // Port 0 = OS assigns a free port
    let collector = WeatherCollector::new(config).unwrap();

    let (tx, rx) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(start_api_server(collector, async {
        rx.await.ok();
    }));

    tokio::time::sleep(Duration::from_millis(50)).await;
    tx.send(()).unwrap();

    let result = tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .unwrap()
        .unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_cors_enabled() {
    let (app, _) = create_test_app(test_config());

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let (status, headers, _) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert!(
        headers.contains_key("access-control-allow-origin"),
        "CORS header should be present when CORS is enabled"
    );
}

#[tokio::test]
async fn test_cors_disabled() {
    let mut config = test_config();
    config.server.api.cors_enabled = false;
    let (app, _) = create_test_app(config);

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let (_, headers, _) = send(&app, request).await;

    assert!(!headers.contains_key("access-control-allow-origin"));
}

#[tokio::test]
async fn test_cors_specific_origin() {
    let mut config = test_config();
    config.server.api.cors_origins = vec!["http://dashboard.local".to_string()];
    let (app, _) = create_test_app(config);

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://dashboard.local")
        .body(Body::empty())
        .unwrap();
    let (_, headers, _) = send(&app, request).await;

    assert_eq!(
        headers.get("access-control-allow-origin").unwrap(),
        "http://dashboard.local"
    );
}

#[tokio::test]
async fn test_api_key_protects_session_routes() {
    let mut config = test_config();
    config.server.api.api_key = Some("service-key".to_string());
    let (app, _) = create_test_app(config);

    let (status, body) = send_json(&app, get("/sessions")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "unauthorized");

    let request = Request::builder()
        .uri("/sessions")
        .header("X-Api-Key", "service-key")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send_json(&app, request).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send_json(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_swagger_ui_can_be_disabled() {
    let mut config = test_config();
    config.server.api.swagger_ui = false;
    let (app, _) = create_test_app(config);

    let (status, _, _) = send(&app, get("/swagger-ui")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
