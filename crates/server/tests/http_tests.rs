//! Routing and status-code mapping through the real router.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request as HttpRequest, StatusCode};
use serde_json::{json, Value};
use tokio::sync::watch;
use tower::ServiceExt;

use cask_engine::Store;
use cask_executor::RuntimeConfig;
use cask_server::routes::router;
use cask_server::state::{AppState, RunState, ServerStatus};

fn test_state(dir: &tempfile::TempDir, compress: bool) -> AppState {
    let store = Store::open(dir.path().join("t.cask")).unwrap();
    let (shutdown, _) = watch::channel(false);
    let state = AppState {
        store: Arc::new(store),
        cfg: Arc::new(RuntimeConfig::default()),
        status: Arc::new(ServerStatus::new()),
        compress_response: compress,
        shutdown,
    };
    state.status.set(RunState::Running);
    state
}

fn post(path: &str, body: Value) -> HttpRequest<Body> {
    HttpRequest::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn unknown_route_is_404() {
    let dir = tempfile::tempdir().unwrap();
    let app = router(test_state(&dir, false));
    let resp = app
        .oneshot(post("/no-such-op", json!({})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"invalid request url");
}

#[tokio::test]
async fn malformed_body_is_400() {
    let dir = tempfile::tempdir().unwrap();
    let app = router(test_state(&dir, false));
    let req = HttpRequest::builder()
        .method("POST")
        .uri("/get")
        .body(Body::from("{not json"))
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn not_running_is_503() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(&dir, false);
    state.status.set(RunState::Down);
    let app = router(state);
    let resp = app
        .oneshot(post("/get", json!({"bktName": "b", "keys": []})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn put_then_getone_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(&dir, false);

    let app = router(state.clone());
    let resp = app
        .oneshot(post(
            "/put",
            json!({
                "bktName": "location",
                "keyField": "id",
                "recs": [{"id": "100", "zip": "11111"}],
            }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let envelope = body_json(resp).await;
    assert_eq!(envelope["status"], "ok");
    assert_eq!(envelope["putCnt"], 1);

    let app = router(state);
    let resp = app
        .oneshot(post("/getone", json!({"bktName": "location", "key": "100"})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let envelope = body_json(resp).await;
    assert_eq!(envelope["status"], "ok");
    assert_eq!(envelope["rec"]["zip"], "11111");
}

#[tokio::test]
async fn bad_input_is_200_with_fail_envelope() {
    let dir = tempfile::tempdir().unwrap();
    let app = router(test_state(&dir, false));
    let resp = app
        .oneshot(post(
            "/put",
            json!({
                "bktName": "b",
                "keyField": "id",
                "recs": [{"no_id": true}],
            }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let envelope = body_json(resp).await;
    assert_eq!(envelope["status"], "fail");
}

#[tokio::test]
async fn gzip_applies_when_enabled_and_accepted() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(&dir, true);

    let mut req = post("/get", json!({"bktName": "b", "keys": []}));
    req.headers_mut()
        .insert(header::ACCEPT_ENCODING, "gzip".parse().unwrap());
    let app = router(state.clone());
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::CONTENT_ENCODING).unwrap(),
        "gzip"
    );

    // without Accept-Encoding the body stays plain
    let app = router(state);
    let resp = app
        .oneshot(post("/get", json!({"bktName": "b", "keys": []})))
        .await
        .unwrap();
    assert!(resp.headers().get(header::CONTENT_ENCODING).is_none());
}

#[tokio::test]
async fn trace_endpoints_toggle_flag() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(&dir, false);

    let app = router(state.clone());
    let resp = app.oneshot(post("/traceon", json!({}))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(cask_core::trace::enabled());

    let app = router(state);
    let resp = app.oneshot(post("/traceoff", json!({}))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(!cask_core::trace::enabled());
}
