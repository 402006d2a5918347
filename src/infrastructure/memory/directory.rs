//! In-memory user and job directory, optionally seeded from a JSON file.

use std::path::Path;

use async_trait::async_trait;
use dashmap::DashMap;
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::{JobDirectory, JobRecord, UserDirectory, UserRecord};
use crate::shared::error::AppError;

/// Seed file layout: `{ "users": [...], "jobs": [...] }`.
#[derive(Debug, Default, Deserialize)]
pub struct DirectorySeed {
    #[serde(default)]
    pub users: Vec<UserRecord>,
    #[serde(default)]
    pub jobs: Vec<JobRecord>,
}

#[derive(Default)]
pub struct InMemoryDirectory {
    users: DashMap<Uuid, UserRecord>,
    jobs: DashMap<Uuid, JobRecord>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_seed(seed: DirectorySeed) -> Self {
        let directory = Self::new();
        seed.users.into_iter().for_each(|u| directory.insert_user(u));
        seed.jobs.into_iter().for_each(|j| directory.insert_job(j));
        directory
    }

    /// Load a seed file written in the [`DirectorySeed`] layout.
    pub fn from_seed_file(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::Internal(format!("cannot read seed file {}: {}", path.display(), e))
        })?;
        let seed: DirectorySeed = serde_json::from_str(&raw).map_err(|e| {
            AppError::Internal(format!("invalid seed file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            users = seed.users.len(),
            jobs = seed.jobs.len(),
            "Directory seeded"
        );
        Ok(Self::from_seed(seed))
    }

    pub fn insert_user(&self, user: UserRecord) {
        self.users.insert(user.id, user);
    }

    pub fn insert_job(&self, job: JobRecord) {
        self.jobs.insert(job.id, job);
    }
}

#[async_trait]
impl UserDirectory for InMemoryDirectory {
    async fn find_user(&self, user_id: Uuid) -> Result<Option<UserRecord>, AppError> {
        Ok(self.users.get(&user_id).map(|u| u.value().clone()))
    }
}

#[async_trait]
impl JobDirectory for InMemoryDirectory {
    async fn find_job(&self, job_id: Uuid) -> Result<Option<JobRecord>, AppError> {
        Ok(self.jobs.get(&job_id).map(|j| j.value().clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserRole;

    #[tokio::test]
    async fn test_seed_parsing() {
        let seed: DirectorySeed = serde_json::from_value(serde_json::json!({
            "users": [{
                "id": "0192f0c4-0000-7000-8000-000000000001",
                "name": "Dana",
                "email": "dana@example.com",
                "role": "employer",
                "resume_ref": null
            }],
            "jobs": [{
                "id": "0192f0c4-0000-7000-8000-0000000000a1",
                "employer_id": "0192f0c4-0000-7000-8000-000000000001",
                "title": "Data Engineer"
            }]
        }))
        .unwrap();

        let directory = InMemoryDirectory::from_seed(seed);
        let employer_id: Uuid = "0192f0c4-0000-7000-8000-000000000001".parse().unwrap();
        let job_id: Uuid = "0192f0c4-0000-7000-8000-0000000000a1".parse().unwrap();

        let employer = directory.find_user(employer_id).await.unwrap().unwrap();
        assert_eq!(employer.role, UserRole::Employer);
        let job = directory.find_job(job_id).await.unwrap().unwrap();
        assert_eq!(job.employer_id, employer_id);
    }

    #[test]
    fn test_missing_seed_file() {
        let result = InMemoryDirectory::from_seed_file("/nonexistent/seed.json");
        assert!(matches!(result, Err(AppError::Internal(_))));
    }
}
