mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{ADMIN_CODE, setup_outbox_bot};
use http_body_util::BodyExt;
use schoolbot::router::init_router;
use serde_json::{Value, json};
use tower::ServiceExt;

async fn post_event(app: axum::Router, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/api/events")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&body).unwrap())
}

async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_health() {
    let (state, _dir) = setup_outbox_bot().await;
    let (status, body) = get_json(init_router(state), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_start_event_returns_replies() {
    let (state, _dir) = setup_outbox_bot().await;
    let (status, body) = post_event(
        init_router(state),
        json!({ "from": 42, "name": "Ann", "kind": "text", "text": "/start" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let reply = &body["replies"][0];
    assert_eq!(reply["text"], "Welcome, Ann!\nAre you a parent or a teacher?");
    assert_eq!(reply["keyboard"]["type"], "reply");
    assert_eq!(reply["keyboard"]["rows"][0][0], "I am a parent");
}

#[tokio::test]
async fn test_conversational_errors_are_ok_responses() {
    let (state, _dir) = setup_outbox_bot().await;
    let (status, body) = post_event(
        init_router(state),
        json!({ "from": 42, "kind": "callback", "payload": "nonsense" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["replies"][0]["text"], "Request not found.");
}

#[tokio::test]
async fn test_malformed_events_are_rejected() {
    let (state, _dir) = setup_outbox_bot().await;
    let app = init_router(state);

    let (status, body) = post_event(app.clone(), json!({ "kind": "text", "text": "hi" })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("from"));

    let (status, _) = post_event(
        app,
        json!({ "from": 42, "kind": "text", "text": "x".repeat(5000) }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_admin_prompts_land_in_the_outbox() {
    let (state, _dir) = setup_outbox_bot().await;
    let app = init_router(state);
    let text = |from: i64, text: &str| json!({ "from": from, "kind": "text", "text": text });

    post_event(app.clone(), text(1, "/admin")).await;
    post_event(app.clone(), text(1, ADMIN_CODE)).await;
    post_event(app.clone(), text(1, "Add student")).await;
    post_event(app.clone(), text(1, "Ava")).await;
    let (_, body) = post_event(app.clone(), text(1, "Grade 5")).await;
    let reply = body["replies"][0]["text"].as_str().unwrap();
    let student_id = &reply[reply.find("Student id: ").unwrap() + 12..][..10];

    post_event(app.clone(), text(10, "I am a parent")).await;
    post_event(app.clone(), text(10, student_id)).await;

    let (status, body) = get_json(app.clone(), "/api/outbox/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["identity"], 1);
    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    let buttons = &messages[0]["keyboard"]["rows"];
    assert_eq!(
        buttons[0][0]["payload"],
        format!("approve_parent_10_{student_id}")
    );

    // Drained
    let (_, body) = get_json(app, "/api/outbox/1").await;
    assert!(body["messages"].as_array().unwrap().is_empty());
}
