//! End-to-end API integration tests
//!
//! These tests run the real cycle loop on a short tick and verify:
//! - Health check and request validation
//! - Reports, tag requests and mail flowing into the game loop
//! - Field state and recent posts read back over HTTP

use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tag_manager::api::{self, AppState};
use tag_manager::config::TagConfig;
use tag_manager::game::{FieldSnapshot, TagManager};
use tag_manager::infrastructure::{DriverHandle, GameDriver};
use tower::util::ServiceExt; // for oneshot

const FIELD: &str = "
    zone_one = pts={0,0:120,0:120,-100:0,-100}
    zone_two = pts={0,-100:120,-100:120,-200:0,-200}
";

/// Setup test application with a running cycle loop
fn setup_app() -> (Router, DriverHandle) {
    let (config, _) = TagConfig::parse(FIELD);
    let (driver, handle) = GameDriver::new(TagManager::new(config), Duration::from_millis(20));
    driver.spawn();
    (api::router(AppState::new(handle.clone())), handle)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    let request = match body {
        Some(body) => request.body(Body::from(body.to_string())).unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

/// Polls the published snapshot until `check` holds
async fn wait_for(handle: &DriverHandle, check: impl Fn(&FieldSnapshot) -> bool) {
    let mut updates = handle.subscribe();
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if check(&*handle.snapshot()) {
                return;
            }
            updates.changed().await.unwrap();
        }
    })
    .await
    .expect("condition reached before timeout");
}

#[tokio::test]
async fn test_health_check() {
    let (app, handle) = setup_app();

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"OK");
    handle.shutdown();
}

#[tokio::test]
async fn test_tag_flow_over_http() {
    let (app, handle) = setup_app();

    let (status, body) = send(
        &app,
        "POST",
        "/api/reports",
        Some(json!({"name": "red1", "group": "red", "type": "kayak", "x": 10.0, "y": -10.0})),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["queued"], true);

    let (status, _) = send(
        &app,
        "POST",
        "/api/mail",
        Some(json!({"key": "NODE_REPORT", "value": "NAME=blue1,TYPE=kayak,X=15,Y=-12,GROUP=blue"})),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);

    wait_for(&handle, |s| s.agents.len() == 2).await;

    let (status, _) = send(&app, "POST", "/api/tags", Some(json!({"vname": "red1"}))).await;
    assert_eq!(status, StatusCode::ACCEPTED);

    wait_for(&handle, |s| s.tagged.contains(&"blue1".to_string())).await;

    let (status, body) = send(&app, "GET", "/api/tagged", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tagged"], json!(["blue1"]));

    let (status, body) = send(&app, "GET", "/api/agents/blue1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "blue1");
    assert_eq!(body["tag"]["now_tagged"], true);
    assert_eq!(body["tag"]["reason"], "enemy");

    let (status, body) = send(&app, "GET", "/api/posts?after=0", None).await;
    assert_eq!(status, StatusCode::OK);
    let posts = body.as_array().unwrap();
    assert!(posts
        .iter()
        .any(|p| p["key"] == "TAG_RESULT_RED1" && p["value"] == "event=1,src=red1,team=red,tagged=blue1"));

    let (status, _) = send(&app, "POST", "/api/untags", Some(json!({"vname": "blue1"}))).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    wait_for(&handle, |s| s.tagged.is_empty()).await;

    handle.shutdown();
}

#[tokio::test]
async fn test_unknown_agent_lookup() {
    let (app, handle) = setup_app();

    let (status, body) = send(&app, "GET", "/api/agents/ghost", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Unknown vehicle [ghost]");
    handle.shutdown();
}

#[tokio::test]
async fn test_unknown_requester_is_counted() {
    let (app, handle) = setup_app();

    let (status, _) = send(&app, "POST", "/api/tags", Some(json!({"vname": "ghost"}))).await;
    assert_eq!(status, StatusCode::ACCEPTED);

    wait_for(&handle, |s| s.diagnostics.unknown_vehicle_requests == 1).await;

    let (_, body) = send(&app, "GET", "/api/status", None).await;
    assert_eq!(body["diagnostics"]["unknown_vehicle_requests"], 1);
    assert!(body["recent_posts"]
        .as_array()
        .unwrap()
        .iter()
        .any(|p| p["value"] == "Failed VTag Post: Unknown vehicle [ghost]"));
    handle.shutdown();
}

#[tokio::test]
async fn test_empty_vname_is_rejected() {
    let (app, handle) = setup_app();

    let (status, body) = send(&app, "POST", "/api/tags", Some(json!({"vname": "  "}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "vname must not be empty");
    handle.shutdown();
}

#[tokio::test]
async fn test_zones_are_listed() {
    let (app, handle) = setup_app();
    wait_for(&handle, |s| s.cycle >= 1).await;

    let (status, body) = send(&app, "GET", "/api/zones", None).await;

    assert_eq!(status, StatusCode::OK);
    let zones = body.as_array().unwrap();
    assert_eq!(zones.len(), 2);
    assert_eq!(zones[0]["team"], "red");
    assert_eq!(zones[1]["color"], "light_blue");
    handle.shutdown();
}

#[tokio::test]
async fn test_undecodable_report_is_counted_as_dropped() {
    let (app, handle) = setup_app();

    let (status, body) = send(
        &app,
        "POST",
        "/api/reports",
        Some(json!({"name": "red1", "group": "red", "x": "ten", "y": -10.0})),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["queued"], true);

    wait_for(&handle, |s| s.diagnostics.reports_dropped == 1).await;

    let snapshot = handle.snapshot();
    assert_eq!(snapshot.diagnostics.reports_received, 1);
    assert!(snapshot.agents.is_empty());
    handle.shutdown();
}

#[tokio::test]
async fn test_unhandled_mail_is_counted() {
    let (app, handle) = setup_app();

    let (status, _) = send(&app, "POST", "/api/mail", Some(json!({"key": "DEPLOY_ALL", "value": "true"}))).await;
    assert_eq!(status, StatusCode::ACCEPTED);

    wait_for(&handle, |s| s.diagnostics.unhandled_mail == 1).await;
    handle.shutdown();
}
