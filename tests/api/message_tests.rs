//! Message thread API tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use application_hub::domain::UserRole;

use crate::common::TestApp;

async fn send(app: &TestApp, id: &str, token: &str, content: &str) -> Value {
    let response = app
        .server
        .post(&format!("/api/v1/applications/{}/messages", id))
        .authorization_bearer(token)
        .json(&json!({ "content": content }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()
}

async fn thread(app: &TestApp, id: &str, token: &str) -> Value {
    app.server
        .get(&format!("/api/v1/applications/{}/messages", id))
        .add_query_param("order", "oldest_first")
        .authorization_bearer(token)
        .await
        .json::<Value>()
}

#[tokio::test]
async fn test_reply_marks_counterpart_message_read() {
    let app = TestApp::new().await;
    let id = app.apply_id().await;

    let first = send(&app, &id, &app.job_seeker.token, "Hi").await;
    assert_eq!(first["role"], "jobseeker");
    assert_eq!(first["read"], false);

    let second = send(&app, &id, &app.employer.token, "Hello").await;
    assert_eq!(second["role"], "employer");

    let view = thread(&app, &id, &app.job_seeker.token).await;
    let messages = view["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["content"], "Hi");
    assert_eq!(messages[0]["read"], true);
    assert_eq!(messages[1]["read"], false);
    assert_eq!(messages[1]["sender"]["name"], app.employer.name.as_str());
    assert_eq!(view["unread_count"], 1);
}

#[tokio::test]
async fn test_mark_read_whole_thread() {
    let app = TestApp::new().await;
    let id = app.apply_id().await;
    send(&app, &id, &app.employer.token, "One").await;
    send(&app, &id, &app.employer.token, "Two").await;

    let response = app
        .server
        .post(&format!("/api/v1/applications/{}/messages/read", id))
        .authorization_bearer(&app.job_seeker.token)
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["marked"], 2);

    // Re-marking is a no-op
    let again = app
        .server
        .post(&format!("/api/v1/applications/{}/messages/read", id))
        .authorization_bearer(&app.job_seeker.token)
        .json(&json!({}))
        .await;
    assert_eq!(again.json::<Value>()["marked"], 0);
}

#[tokio::test]
async fn test_mark_read_single_message() {
    let app = TestApp::new().await;
    let id = app.apply_id().await;
    let message = send(&app, &id, &app.employer.token, "One").await;
    send(&app, &id, &app.employer.token, "Two").await;

    let response = app
        .server
        .post(&format!("/api/v1/applications/{}/messages/read", id))
        .authorization_bearer(&app.job_seeker.token)
        .json(&json!({ "message_id": message["id"] }))
        .await;
    assert_eq!(response.json::<Value>()["marked"], 1);

    let view = thread(&app, &id, &app.job_seeker.token).await;
    assert_eq!(view["unread_count"], 1);
}

#[tokio::test]
async fn test_blank_and_oversized_messages_are_rejected() {
    let app = TestApp::new().await;
    let id = app.apply_id().await;

    for content in ["   ".to_string(), "x".repeat(501)] {
        app.server
            .post(&format!("/api/v1/applications/{}/messages", id))
            .authorization_bearer(&app.job_seeker.token)
            .json(&json!({ "content": content }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn test_outsiders_and_admins_cannot_post() {
    let app = TestApp::new().await;
    let id = app.apply_id().await;
    let outsider = app.add_user(UserRole::Employer);

    for token in [&outsider.token, &app.admin.token] {
        app.server
            .post(&format!("/api/v1/applications/{}/messages", id))
            .authorization_bearer(token)
            .json(&json!({ "content": "hello" }))
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }
}
