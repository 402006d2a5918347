//! Collaborator directories backed by the shared `users` and `jobs` tables.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{JobDirectory, JobRecord, UserDirectory, UserRecord, UserRole};
use crate::shared::error::AppError;

/// PostgreSQL reader for user profiles and job postings.
pub struct PgDirectory {
    pool: PgPool,
}

impl PgDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    role: String,
    resume_url: Option<String>,
}

impl UserRow {
    fn into_record(self) -> Result<UserRecord, AppError> {
        let role = UserRole::parse(&self.role)
            .ok_or_else(|| AppError::Internal(format!("unknown user role '{}'", self.role)))?;
        Ok(UserRecord {
            id: self.id,
            name: self.name,
            email: self.email,
            role,
            resume_ref: self.resume_url,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct JobRow {
    id: Uuid,
    employer_id: Uuid,
    title: String,
}

#[async_trait]
impl UserDirectory for PgDirectory {
    async fn find_user(&self, user_id: Uuid) -> Result<Option<UserRecord>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, email, role, resume_url FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::into_record).transpose()
    }
}

#[async_trait]
impl JobDirectory for PgDirectory {
    async fn find_job(&self, job_id: Uuid) -> Result<Option<JobRecord>, AppError> {
        let row = sqlx::query_as::<_, JobRow>("SELECT id, employer_id, title FROM jobs WHERE id = $1")
            .bind(job_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| JobRecord {
            id: r.id,
            employer_id: r.employer_id,
            title: r.title,
        }))
    }
}
