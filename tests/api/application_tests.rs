//! Application lifecycle API tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use uuid::Uuid;

use application_hub::domain::UserRole;

use crate::common::{token_for, TestApp};

#[tokio::test]
async fn test_apply_creates_pending_application() {
    let app = TestApp::new().await;

    let body = app.apply().await;

    assert_eq!(body["status"], "pending");
    assert_eq!(body["job_id"], app.job.id.to_string());
    assert_eq!(body["employer_id"], app.employer.id.to_string());
    // Falls back to the profile resume
    assert_eq!(body["resume_ref"], "profile-resume.pdf");

    let history = body["status_history"].as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["status"], "pending");
    assert_eq!(history[0]["actor_id"], app.job_seeker.id.to_string());
}

#[tokio::test]
async fn test_second_apply_is_a_conflict() {
    let app = TestApp::new().await;
    app.apply().await;

    let response = app
        .server
        .post("/api/v1/applications")
        .authorization_bearer(&app.job_seeker.token)
        .json(&json!({ "job_id": app.job.id }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_apply_to_unknown_job_is_not_found() {
    let app = TestApp::new().await;

    let response = app
        .server
        .post("/api/v1/applications")
        .authorization_bearer(&app.job_seeker.token)
        .json(&json!({ "job_id": Uuid::new_v4() }))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_requests_without_valid_token_are_unauthorized() {
    let app = TestApp::new().await;

    app.server
        .get("/api/v1/applications/mine")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    let expired = token_for(app.job_seeker.id, UserRole::JobSeeker, -3600);
    app.server
        .get("/api/v1/applications/mine")
        .authorization_bearer(&expired)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_employer_accepts_and_history_grows() {
    let app = TestApp::new().await;
    let id = app.apply_id().await;

    let response = app
        .server
        .patch(&format!("/api/v1/applications/{}/status", id))
        .authorization_bearer(&app.employer.token)
        .json(&json!({ "status": "accepted", "notes": "Great fit" }))
        .await;
    response.assert_status_ok();

    let body = response.json::<Value>();
    assert_eq!(body["status"], "accepted");
    let history = body["status_history"].as_array().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1]["previous_status"], "pending");
    assert_eq!(history[1]["notes"], "Great fit");
}

#[tokio::test]
async fn test_job_seeker_cannot_change_status() {
    let app = TestApp::new().await;
    let id = app.apply_id().await;

    app.server
        .patch(&format!("/api/v1/applications/{}/status", id))
        .authorization_bearer(&app.job_seeker.token)
        .json(&json!({ "status": "accepted" }))
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_unknown_status_value_is_rejected() {
    let app = TestApp::new().await;
    let id = app.apply_id().await;

    let response = app
        .server
        .patch(&format!("/api/v1/applications/{}/status", id))
        .authorization_bearer(&app.employer.token)
        .json(&json!({ "status": "hired" }))
        .await;

    assert!(response.status_code().is_client_error());
}

#[tokio::test]
async fn test_get_application_is_limited_to_parties_and_admin() {
    let app = TestApp::new().await;
    let id = app.apply_id().await;
    let outsider = app.add_user(UserRole::JobSeeker);

    for (token, viewer) in [
        (&app.job_seeker.token, "jobseeker"),
        (&app.employer.token, "employer"),
        (&app.admin.token, "admin"),
    ] {
        let response = app
            .server
            .get(&format!("/api/v1/applications/{}", id))
            .authorization_bearer(token)
            .await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["viewer"], viewer);
    }

    app.server
        .get(&format!("/api/v1/applications/{}", id))
        .authorization_bearer(&outsider.token)
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_get_application_history_order() {
    let app = TestApp::new().await;
    let id = app.apply_id().await;
    app.server
        .patch(&format!("/api/v1/applications/{}/status", id))
        .authorization_bearer(&app.employer.token)
        .json(&json!({ "status": "reviewed" }))
        .await
        .assert_status_ok();

    let newest = app
        .server
        .get(&format!("/api/v1/applications/{}", id))
        .authorization_bearer(&app.employer.token)
        .await
        .json::<Value>();
    assert_eq!(newest["status_history"][0]["status"], "reviewed");

    let oldest = app
        .server
        .get(&format!("/api/v1/applications/{}", id))
        .add_query_param("order", "oldest_first")
        .authorization_bearer(&app.employer.token)
        .await
        .json::<Value>();
    assert_eq!(oldest["status_history"][0]["status"], "pending");
}

#[tokio::test]
async fn test_listings() {
    let app = TestApp::new().await;
    app.apply().await;

    let mine = app
        .server
        .get("/api/v1/applications/mine")
        .authorization_bearer(&app.job_seeker.token)
        .await
        .json::<Value>();
    assert_eq!(mine["total"], 1);

    let for_job = app
        .server
        .get(&format!("/api/v1/jobs/{}/applications", app.job.id))
        .authorization_bearer(&app.employer.token)
        .await
        .json::<Value>();
    assert_eq!(for_job["total"], 1);

    let received = app
        .server
        .get("/api/v1/applications/received")
        .authorization_bearer(&app.employer.token)
        .await
        .json::<Value>();
    assert_eq!(received["applications"][0]["job_id"], app.job.id.to_string());

    let as_admin = app
        .server
        .get("/api/v1/applications/received")
        .add_query_param("employer_id", app.employer.id)
        .authorization_bearer(&app.admin.token)
        .await
        .json::<Value>();
    assert_eq!(as_admin["total"], 1);
}

#[tokio::test]
async fn test_other_employer_cannot_list_job_applications() {
    let app = TestApp::new().await;
    app.apply().await;
    let rival = app.add_user(UserRole::Employer);

    app.server
        .get(&format!("/api/v1/jobs/{}/applications", app.job.id))
        .authorization_bearer(&rival.token)
        .await
        .assert_status(StatusCode::FORBIDDEN);
}
