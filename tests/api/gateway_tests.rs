//! Gateway WebSocket tests

use axum_test::TestWebSocket;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::common::{TestApp, TestUser};

/// Connect with a bearer header and consume Hello and READY.
async fn connect(app: &TestApp, user: &TestUser) -> TestWebSocket {
    let mut ws = app
        .server
        .get_websocket("/gateway")
        .authorization_bearer(&user.token)
        .await
        .into_websocket()
        .await;

    let hello = ws.receive_json::<Value>().await;
    assert_eq!(hello["op"], 10);
    assert!(hello["d"]["heartbeat_interval"].as_u64().unwrap() > 0);

    let ready = ws.receive_json::<Value>().await;
    assert_eq!(ready["op"], 0);
    assert_eq!(ready["t"], "READY");
    assert_eq!(ready["s"], 1);
    assert_eq!(ready["d"]["user_id"], user.id.to_string());
    ws
}

/// Read `count` dispatch frames and return their event names.
async fn event_names(ws: &mut TestWebSocket, count: usize) -> Vec<String> {
    let mut names = Vec::with_capacity(count);
    for _ in 0..count {
        let frame = ws.receive_json::<Value>().await;
        assert_eq!(frame["op"], 0);
        names.push(frame["t"].as_str().unwrap_or_default().to_string());
    }
    names
}

#[tokio::test]
async fn test_invalid_token_is_rejected() {
    let app = TestApp::with_http_transport().await;

    let mut ws = app
        .server
        .get_websocket("/gateway")
        .add_query_param("token", "not-a-jwt")
        .await
        .into_websocket()
        .await;

    assert_eq!(ws.receive_json::<Value>().await["op"], 10);
    assert_eq!(ws.receive_json::<Value>().await["op"], 9);
}

#[tokio::test]
async fn test_query_token_is_accepted() {
    let app = TestApp::with_http_transport().await;

    let mut ws = app
        .server
        .get_websocket("/gateway")
        .add_query_param("token", &app.employer.token)
        .await
        .into_websocket()
        .await;

    assert_eq!(ws.receive_json::<Value>().await["op"], 10);
    assert_eq!(ws.receive_json::<Value>().await["t"], "READY");
}

#[tokio::test]
async fn test_heartbeat_is_acknowledged() {
    let app = TestApp::with_http_transport().await;
    let mut ws = connect(&app, &app.job_seeker).await;

    ws.send_json(&json!({ "op": 1 })).await;

    assert_eq!(ws.receive_json::<Value>().await, json!({ "op": 11 }));
}

#[tokio::test]
async fn test_employer_receives_submission_with_aliases() {
    let app = TestApp::with_http_transport().await;
    let mut ws = connect(&app, &app.employer).await;

    app.apply().await;

    let names = event_names(&mut ws, 3).await;
    assert_eq!(
        names,
        vec!["application.submitted", "newApplication", "application:new"]
    );
}

#[tokio::test]
async fn test_job_seeker_receives_status_change() {
    let app = TestApp::with_http_transport().await;
    let id = app.apply_id().await;
    let mut ws = connect(&app, &app.job_seeker).await;

    app.server
        .patch(&format!("/api/v1/applications/{}/status", id))
        .authorization_bearer(&app.employer.token)
        .json(&json!({ "status": "accepted" }))
        .await
        .assert_status_ok();

    let frame = ws.receive_json::<Value>().await;
    assert_eq!(frame["t"], "application.status_changed");
    assert_eq!(frame["s"], 2);
    assert_eq!(frame["d"]["status"], "accepted");
    assert_eq!(frame["d"]["previous_status"], "pending");
}

#[tokio::test]
async fn test_join_requires_view_permission_and_is_idempotent() {
    let app = TestApp::with_http_transport().await;
    let id = app.apply_id().await;

    let mut employer = connect(&app, &app.employer).await;
    employer
        .send_json(&json!({ "op": 20, "d": { "application_id": id } }))
        .await;
    let ack = employer.receive_json::<Value>().await;
    assert_eq!(ack["op"], 22);
    assert_eq!(ack["d"]["ok"], true);
    assert_eq!(ack["d"]["changed"], true);

    employer
        .send_json(&json!({ "op": 20, "d": { "application_id": id } }))
        .await;
    let again = employer.receive_json::<Value>().await;
    assert_eq!(again["d"]["ok"], true);
    assert_eq!(again["d"]["changed"], false);

    let outsider = app.add_user(application_hub::domain::UserRole::Employer);
    let mut other = connect(&app, &outsider).await;
    other
        .send_json(&json!({ "op": 20, "d": { "application_id": id } }))
        .await;
    let refused = other.receive_json::<Value>().await;
    assert_eq!(refused["d"]["ok"], false);

    employer
        .send_json(&json!({ "op": 21, "d": { "application_id": id } }))
        .await;
    let left = employer.receive_json::<Value>().await;
    assert_eq!(left["d"]["changed"], true);
}

#[tokio::test]
async fn test_message_reaches_counterpart_once_per_alias() {
    let app = TestApp::with_http_transport().await;
    let id = app.apply_id().await;

    // In both the user channel and the application channel
    let mut employer = connect(&app, &app.employer).await;
    employer
        .send_json(&json!({ "op": 20, "d": { "application_id": id } }))
        .await;
    employer.receive_json::<Value>().await;

    app.server
        .post(&format!("/api/v1/applications/{}/messages", id))
        .authorization_bearer(&app.job_seeker.token)
        .json(&json!({ "content": "Hi" }))
        .await;

    let names = event_names(&mut employer, 3).await;
    assert_eq!(names, vec!["message.new", "newMessage", "application:message"]);

    // Nothing duplicated behind them
    employer.send_json(&json!({ "op": 1 })).await;
    assert_eq!(employer.receive_json::<Value>().await["op"], 11);
}
