//! User record and directory trait.
//!
//! Users are owned by the profile service. This crate only reads the
//! `users` table through [`UserDirectory`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::AppError;

/// User role matching the `role` column of the `users` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    JobSeeker,
    Employer,
    Admin,
}

impl UserRole {
    /// Convert from database string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "jobseeker" | "job_seeker" => Some(Self::JobSeeker),
            "employer" => Some(Self::Employer),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::JobSeeker => "jobseeker",
            Self::Employer => "employer",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The subset of a user profile this service needs.
///
/// Read from the `users` table:
/// - id: UUID PRIMARY KEY
/// - name: TEXT NOT NULL
/// - email: TEXT NOT NULL
/// - role: TEXT NOT NULL
/// - resume_url: TEXT NULL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    /// Resume stored on the profile, used when an application omits one
    pub resume_ref: Option<String>,
}

impl UserRecord {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Read-only access to user profiles.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_user(&self, user_id: Uuid) -> Result<Option<UserRecord>, AppError>;
}
