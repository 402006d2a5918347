//! Interview API tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::common::TestApp;

fn slot() -> Value {
    json!({
        "date": "2026-11-03",
        "time": "14:00:00",
        "location": "HQ, floor 3",
        "type": "in-person"
    })
}

async fn schedule(app: &TestApp, id: &str) -> Value {
    let response = app
        .server
        .post(&format!("/api/v1/applications/{}/interview", id))
        .authorization_bearer(&app.employer.token)
        .json(&slot())
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()
}

#[tokio::test]
async fn test_schedule_on_pending_moves_to_interviewed() {
    let app = TestApp::new().await;
    let id = app.apply_id().await;

    let body = schedule(&app, &id).await;

    assert_eq!(body["status"], "interviewed");
    assert_eq!(body["interview"]["status"], "scheduled");
    assert_eq!(body["interview"]["type"], "in-person");
    assert_eq!(body["interview"]["job_seeker_confirmed"], false);

    let history = body["status_history"].as_array().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(
        history[1]["notes"],
        "Interview scheduled for 2026-11-03 at 14:00 (in-person)"
    );
}

#[tokio::test]
async fn test_job_seeker_cannot_schedule() {
    let app = TestApp::new().await;
    let id = app.apply_id().await;

    app.server
        .post(&format!("/api/v1/applications/{}/interview", id))
        .authorization_bearer(&app.job_seeker.token)
        .json(&slot())
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_empty_location_is_rejected() {
    let app = TestApp::new().await;
    let id = app.apply_id().await;
    let mut body = slot();
    body["location"] = json!("");

    let response = app
        .server
        .post(&format!("/api/v1/applications/{}/interview", id))
        .authorization_bearer(&app.employer.token)
        .json(&body)
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let error = response.json::<Value>();
    assert_eq!(error["errors"][0]["field"], "location");
}

#[tokio::test]
async fn test_confirmation_keeps_application_status() {
    let app = TestApp::new().await;
    let id = app.apply_id().await;
    let scheduled = schedule(&app, &id).await;
    let interview_id = scheduled["interview"]["id"].as_str().unwrap().to_string();

    let response = app
        .server
        .patch(&format!("/api/v1/interviews/{}", interview_id))
        .authorization_bearer(&app.job_seeker.token)
        .json(&json!({ "confirmed": true }))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["job_seeker_confirmed"], true);

    let view = app
        .server
        .get(&format!("/api/v1/applications/{}", id))
        .authorization_bearer(&app.job_seeker.token)
        .await
        .json::<Value>();
    assert_eq!(view["status"], "interviewed");
    assert_eq!(view["status_history"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_patch_permissions() {
    let app = TestApp::new().await;
    let id = app.apply_id().await;
    let scheduled = schedule(&app, &id).await;
    let uri = format!(
        "/api/v1/interviews/{}",
        scheduled["interview"]["id"].as_str().unwrap()
    );

    app.server
        .patch(&uri)
        .authorization_bearer(&app.job_seeker.token)
        .json(&json!({ "status": "cancelled" }))
        .await
        .assert_status(StatusCode::FORBIDDEN);

    app.server
        .patch(&uri)
        .authorization_bearer(&app.employer.token)
        .json(&json!({ "confirmed": true }))
        .await
        .assert_status(StatusCode::FORBIDDEN);

    app.server
        .patch(&uri)
        .authorization_bearer(&app.employer.token)
        .json(&json!({}))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let response = app
        .server
        .patch(&uri)
        .authorization_bearer(&app.employer.token)
        .json(&json!({ "status": "completed" }))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "completed");
}
