//! Common Test Utilities
//!
//! Builds the full router over the in-memory backend and mints tokens.

#![allow(dead_code)]

use std::sync::Arc;

use axum_test::TestServer;
use chrono::Utc;
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use fake::Fake;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use uuid::Uuid;

use application_hub::application::services::Claims;
use application_hub::config::Settings;
use application_hub::domain::{JobRecord, UserRecord, UserRole};
use application_hub::infrastructure::memory::{InMemoryApplicationRepository, InMemoryDirectory};
use application_hub::startup::{create_router, AppState};

pub const TEST_SECRET: &str = "integration-test-secret-at-least-32-chars";

/// A seeded user with a valid bearer token
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: Uuid,
    pub name: String,
    pub role: UserRole,
    pub token: String,
}

/// Test application over the in-memory backend
pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    pub directory: Arc<InMemoryDirectory>,
    pub job_seeker: TestUser,
    pub employer: TestUser,
    pub admin: TestUser,
    pub job: JobRecord,
}

impl TestApp {
    /// Create a new test application with mock HTTP transport
    pub async fn new() -> Self {
        Self::build(false)
    }

    /// Create a test application bound to a real port, for WebSocket tests
    pub async fn with_http_transport() -> Self {
        Self::build(true)
    }

    fn build(http_transport: bool) -> Self {
        let settings = Settings::from_overrides(&[
            ("storage.backend", "memory"),
            ("jwt.secret", TEST_SECRET),
            ("lifecycle.max_message_length", "500"),
        ])
        .expect("test settings");

        let directory = Arc::new(InMemoryDirectory::new());
        let applications = Arc::new(InMemoryApplicationRepository::new());

        let job_seeker = seed_user(&directory, UserRole::JobSeeker, Some("profile-resume.pdf"));
        let employer = seed_user(&directory, UserRole::Employer, None);
        let admin = seed_user(&directory, UserRole::Admin, None);

        let job = JobRecord {
            id: Uuid::new_v4(),
            employer_id: employer.id,
            title: "Backend Engineer".into(),
        };
        directory.insert_job(job.clone());

        let state =
            AppState::with_backends(settings, applications, directory.clone(), directory.clone());
        let router = create_router(state.clone());

        let server = if http_transport {
            TestServer::builder()
                .http_transport()
                .build(router)
                .expect("test server")
        } else {
            TestServer::new(router).expect("test server")
        };

        Self {
            server,
            state,
            directory,
            job_seeker,
            employer,
            admin,
            job,
        }
    }

    /// Seed another user of `role`
    pub fn add_user(&self, role: UserRole) -> TestUser {
        seed_user(&self.directory, role, Some("other-resume.pdf"))
    }

    /// Submit an application as the default job seeker; returns its JSON
    pub async fn apply(&self) -> Value {
        let response = self
            .server
            .post("/api/v1/applications")
            .authorization_bearer(&self.job_seeker.token)
            .json(&json!({ "job_id": self.job.id, "cover_letter": "Hello" }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        response.json::<Value>()
    }

    pub async fn apply_id(&self) -> String {
        self.apply().await["id"]
            .as_str()
            .expect("application id")
            .to_string()
    }
}

fn seed_user(directory: &InMemoryDirectory, role: UserRole, resume: Option<&str>) -> TestUser {
    let user = UserRecord {
        id: Uuid::new_v4(),
        name: Name().fake(),
        email: SafeEmail().fake(),
        role,
        resume_ref: resume.map(String::from),
    };
    directory.insert_user(user.clone());

    TestUser {
        id: user.id,
        name: user.name,
        role,
        token: token_for(user.id, role, 3600),
    }
}

/// Mint an HS256 token; a negative lifetime yields an expired one
pub fn token_for(user_id: Uuid, role: UserRole, lifetime_secs: i64) -> String {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user_id.to_string(),
        role,
        exp: now + lifetime_secs,
        iat: now,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .expect("token")
}
