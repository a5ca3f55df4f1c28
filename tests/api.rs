mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use agora_checkin::routes::create_routes;
use agora_checkin::store::MemoryStore;
use agora_checkin::AppState;

fn app(store: Arc<MemoryStore>) -> (Router, AppState) {
    let state = AppState::new(store, 8);
    (create_routes(state.clone()), state)
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn check_in(app: &Router, code: &str) -> (StatusCode, Value) {
    send(app, Method::POST, "/checkin", Some(json!({ "code": code }))).await
}

#[tokio::test]
async fn test_health_check() {
    let (app, _) = app(Arc::new(MemoryStore::new()));
    let (status, body) = send(&app, Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");
}

#[tokio::test]
async fn test_security_headers_present() {
    let (app, _) = app(Arc::new(MemoryStore::new()));
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let headers = response.headers();
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert!(headers["permissions-policy"]
        .to_str()
        .unwrap()
        .contains("camera=(self)"));
}

#[tokio::test]
async fn test_check_in_over_http() {
    let store = Arc::new(MemoryStore::new());
    let seeded = common::seed(&store, true);
    let (app, _) = app(store.clone());
    let code = seeded.registration.id.to_string();

    let (status, body) = check_in(&app, &code).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["attendee"]["attendee_name"], "Ana Torres");
    assert_eq!(body["message"], "Ana Torres checked in to Rust Meetup.");

    let (status, body) = check_in(&app, &code).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "CONFLICT");
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("Ana Torres"));

    let uri = format!("/registrations/{code}/status");
    let (status, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "checkedIn");
    assert_eq!(body["data"]["label"], "Checked In");

    assert_eq!(store.attendance_count(), 1);
}

#[tokio::test]
async fn test_check_in_rejections_over_http() {
    let store = Arc::new(MemoryStore::new());
    let unapproved = common::seed(&store, false);
    let (app, _) = app(store.clone());

    let (status, body) = check_in(&app, "   ").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let code = unapproved.registration.id.to_string();
    let (status, body) = check_in(&app, &code).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "FORBIDDEN");

    let uri = format!("/registrations/{}/status", uuid::Uuid::new_v4());
    let (status, _) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    assert_eq!(store.attendance_count(), 0);
}

#[tokio::test]
async fn test_report_endpoint_filters() {
    let store = Arc::new(MemoryStore::new());
    let seeded = common::seed(&store, true);
    let ben = common::user("Ben", "Okafor");
    store.add_user(ben.clone());
    store.add_registration(agora_checkin::models::Registration::new(
        ben.id,
        seeded.event.id,
        true,
    ));
    let (app, _) = app(store);

    let code = seeded.registration.id.to_string();
    check_in(&app, &code).await;

    let (status, body) = send(&app, Method::GET, "/attendance/report", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_approved"], 2);
    assert_eq!(body["data"]["checked_in"], 1);
    assert_eq!(body["data"]["pending"], 1);
    assert_eq!(body["data"]["rate"], 50);

    let (_, body) = send(&app, Method::GET, "/attendance/report?status=pending", None).await;
    assert_eq!(body["data"]["matching"], 1);
    assert_eq!(body["data"]["rows"][0]["name"], "Ben Okafor");
    assert_eq!(body["data"]["total_approved"], 2);
    assert_eq!(body["data"]["checked_in"], 1);

    let (_, body) = send(&app, Method::GET, "/attendance/report?search=TORRES", None).await;
    assert_eq!(body["data"]["matching"], 1);
    assert_eq!(body["data"]["rows"][0]["name"], "Ana Torres");
    assert_eq!(body["data"]["pending"], 1);
    assert_eq!(body["data"]["rate"], 50);

    let uri = format!("/attendance/report?event_id={}", uuid::Uuid::new_v4());
    let (_, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(body["data"]["total_approved"], 0);
    assert_eq!(body["data"]["rate"], 0);
}

#[tokio::test]
async fn test_scanner_pauses_after_decoding_a_badge() {
    let store = Arc::new(MemoryStore::new());
    let seeded = common::seed(&store, true);
    let (app, state) = app(store.clone());
    let mut outcomes = state.intake.outcomes();

    let (_, body) = send(&app, Method::GET, "/scanner", None).await;
    assert_eq!(body["data"]["active"], false);

    let (_, body) = send(&app, Method::POST, "/scanner/resume", None).await;
    assert_eq!(body["data"]["active"], true);

    let frame = Request::builder()
        .method(Method::POST)
        .uri("/scanner/frames")
        .body(Body::from(seeded.registration.id.to_string()))
        .unwrap();
    let response = app.clone().oneshot(frame).await.unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    tokio::time::timeout(Duration::from_secs(5), outcomes.changed())
        .await
        .expect("scanner produced no outcome")
        .unwrap();

    let (_, body) = send(&app, Method::GET, "/scanner", None).await;
    assert_eq!(body["data"]["active"], false);
    assert_eq!(body["data"]["last_outcome"]["source"], "camera");
    assert_eq!(body["data"]["last_outcome"]["notification"]["level"], "success");
    assert_eq!(store.attendance_count(), 1);
}
