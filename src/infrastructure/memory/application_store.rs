//! In-memory application store.
//!
//! Each trait method mutates a single DashMap entry while holding its
//! shard lock, which gives the same per-operation atomicity as the
//! PostgreSQL transactions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

use crate::domain::services::TransitionPolicy;
use crate::domain::{
    Application, ApplicationRepository, Interview, InterviewStatus, Message, MessageRole,
    StatusEntry,
};
use crate::shared::error::AppError;

#[derive(Default)]
pub struct InMemoryApplicationRepository {
    applications: DashMap<Uuid, Application>,
    /// (job_id, job_seeker_id) -> application id
    pairs: DashMap<(Uuid, Uuid), Uuid>,
    /// interview id -> application id
    interviews: DashMap<Uuid, Uuid>,
}

impl InMemoryApplicationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn not_found() -> AppError {
        AppError::NotFound("Application".into())
    }

    fn collect_newest_first(&self, keep: impl Fn(&Application) -> bool) -> Vec<Application> {
        let mut found: Vec<Application> = self
            .applications
            .iter()
            .filter(|entry| keep(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        found.sort_by(|a, b| b.applied_at.cmp(&a.applied_at));
        found
    }
}

#[async_trait]
impl ApplicationRepository for InMemoryApplicationRepository {
    async fn insert(&self, application: &Application) -> Result<(), AppError> {
        match self
            .pairs
            .entry((application.job_id, application.job_seeker_id))
        {
            Entry::Occupied(_) => Err(AppError::Conflict(
                "application already exists for this job and job seeker".into(),
            )),
            Entry::Vacant(slot) => {
                self.applications
                    .insert(application.id, application.clone());
                slot.insert(application.id);
                Ok(())
            }
        }
    }

    async fn exists_for(&self, job_id: Uuid, job_seeker_id: Uuid) -> Result<bool, AppError> {
        Ok(self.pairs.contains_key(&(job_id, job_seeker_id)))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Application>, AppError> {
        Ok(self.applications.get(&id).map(|a| a.value().clone()))
    }

    async fn find_by_job(&self, job_id: Uuid) -> Result<Vec<Application>, AppError> {
        Ok(self.collect_newest_first(|a| a.job_id == job_id))
    }

    async fn find_by_job_seeker(&self, job_seeker_id: Uuid) -> Result<Vec<Application>, AppError> {
        Ok(self.collect_newest_first(|a| a.job_seeker_id == job_seeker_id))
    }

    async fn find_by_employer(&self, employer_id: Uuid) -> Result<Vec<Application>, AppError> {
        Ok(self.collect_newest_first(|a| a.employer_id == employer_id))
    }

    async fn append_status(
        &self,
        id: Uuid,
        mut entry: StatusEntry,
        policy: TransitionPolicy,
    ) -> Result<Application, AppError> {
        let mut app = self.applications.get_mut(&id).ok_or_else(Self::not_found)?;
        policy.check(app.status, entry.status)?;

        entry.previous_status = Some(app.status);
        app.status = entry.status;
        app.updated_at = entry.timestamp;
        app.status_history.push(entry);

        Ok(app.clone())
    }

    async fn append_message(
        &self,
        id: Uuid,
        message: &Message,
        mark_read_role: Option<MessageRole>,
    ) -> Result<Application, AppError> {
        let mut app = self.applications.get_mut(&id).ok_or_else(Self::not_found)?;

        if let Some(role) = mark_read_role {
            app.messages
                .iter_mut()
                .filter(|m| m.role == role)
                .for_each(|m| m.read = true);
        }
        app.messages.push(message.clone());
        app.updated_at = message.timestamp;

        Ok(app.clone())
    }

    async fn mark_messages_read(&self, id: Uuid, message_ids: &[Uuid]) -> Result<u64, AppError> {
        let mut app = self.applications.get_mut(&id).ok_or_else(Self::not_found)?;

        let mut marked = 0;
        for message in app
            .messages
            .iter_mut()
            .filter(|m| !m.read && message_ids.contains(&m.id))
        {
            message.read = true;
            marked += 1;
        }
        Ok(marked)
    }

    async fn save_interview(&self, interview: &Interview) -> Result<Application, AppError> {
        let mut app = self
            .applications
            .get_mut(&interview.application_id)
            .ok_or_else(Self::not_found)?;

        app.interview = Some(interview.clone());
        app.updated_at = interview.updated_at;
        self.interviews.insert(interview.id, app.id);

        Ok(app.clone())
    }

    async fn update_interview(
        &self,
        interview_id: Uuid,
        status: Option<InterviewStatus>,
        confirmed: Option<bool>,
        updated_at: DateTime<Utc>,
    ) -> Result<Application, AppError> {
        let not_found = || AppError::NotFound("Interview".into());
        let app_id = self
            .interviews
            .get(&interview_id)
            .map(|e| *e.value())
            .ok_or_else(not_found)?;
        let mut app = self.applications.get_mut(&app_id).ok_or_else(not_found)?;

        let interview = app
            .interview
            .as_mut()
            .filter(|i| i.id == interview_id)
            .ok_or_else(not_found)?;
        if let Some(status) = status {
            interview.status = status;
        }
        if let Some(confirmed) = confirmed {
            interview.job_seeker_confirmed = confirmed;
        }
        interview.updated_at = updated_at;
        app.updated_at = updated_at;

        Ok(app.clone())
    }

    async fn find_interview(&self, interview_id: Uuid) -> Result<Option<Interview>, AppError> {
        let Some(app_id) = self.interviews.get(&interview_id).map(|e| *e.value()) else {
            return Ok(None);
        };
        Ok(self
            .applications
            .get(&app_id)
            .and_then(|app| app.interview.clone())
            .filter(|i| i.id == interview_id))
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
