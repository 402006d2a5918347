//! Job record and directory trait.
//!
//! Job postings are owned by the job board; only the fields needed for
//! authorization and notifications are read here.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::AppError;

/// Read from the `jobs` table (id, employer_id, title).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: Uuid,
    pub employer_id: Uuid,
    pub title: String,
}

/// Read-only access to job postings.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JobDirectory: Send + Sync {
    async fn find_job(&self, job_id: Uuid) -> Result<Option<JobRecord>, AppError>;
}
