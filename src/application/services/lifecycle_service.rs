//! Lifecycle Service
//!
//! Submission, status changes and read access for applications. Every
//! status change goes through [`LifecycleService::set_status`], including
//! the ones triggered by interview scheduling, so the audit trail has a
//! single writer.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::access::{is_admin, require_party};
use super::thread_service::{project_thread, ThreadView};
use crate::application::error::ApplicationError;
use crate::application::events::{DomainEvent, EventPublisher};
use crate::domain::services::TransitionPolicy;
use crate::domain::{
    Application, ApplicationRepository, ApplicationStatus, Interview, JobDirectory, Party,
    SortOrder, StatusEntry, UserDirectory, UserRole,
};

/// Lifecycle service trait
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LifecycleService: Send + Sync {
    /// Submit an application on behalf of a job seeker
    async fn apply(&self, request: ApplyDto) -> Result<Application, ApplicationError>;

    /// Change the current status and append an audit entry
    async fn set_status(
        &self,
        application_id: Uuid,
        actor_id: Uuid,
        change: StatusChange,
    ) -> Result<Application, ApplicationError>;

    /// Read one application as seen by `viewer_id`
    async fn get_application(
        &self,
        application_id: Uuid,
        viewer_id: Uuid,
        order: SortOrder,
    ) -> Result<ApplicationView, ApplicationError>;

    /// Check that `viewer_id` may see an application, without loading a view
    async fn authorize_viewer(
        &self,
        application_id: Uuid,
        viewer_id: Uuid,
    ) -> Result<Party, ApplicationError>;

    /// Applications for one job; employer of the job or admin only
    async fn list_for_job(
        &self,
        job_id: Uuid,
        requester_id: Uuid,
    ) -> Result<Vec<ApplicationSummary>, ApplicationError>;

    /// Applications the job seeker submitted
    async fn list_mine(&self, job_seeker_id: Uuid) -> Result<Vec<ApplicationSummary>, ApplicationError>;

    /// Applications received across an employer's jobs; that employer or admin only
    async fn list_for_employer(
        &self,
        employer_id: Uuid,
        requester_id: Uuid,
    ) -> Result<Vec<ApplicationSummary>, ApplicationError>;
}

/// Apply request
#[derive(Debug, Clone)]
pub struct ApplyDto {
    pub job_id: Uuid,
    pub job_seeker_id: Uuid,
    pub resume_ref: Option<String>,
    pub cover_letter: Option<String>,
}

/// A requested status change
#[derive(Debug, Clone, PartialEq)]
pub struct StatusChange {
    pub status: ApplicationStatus,
    pub notes: Option<String>,
    pub details: Option<serde_json::Value>,
}

impl StatusChange {
    pub fn new(status: ApplicationStatus) -> Self {
        Self {
            status,
            notes: None,
            details: None,
        }
    }

    pub fn with_notes(mut self, notes: Option<String>) -> Self {
        self.notes = notes;
        self
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Full application projection returned by `get_application`
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationView {
    pub id: Uuid,
    pub job_id: Uuid,
    pub job_seeker_id: Uuid,
    pub employer_id: Uuid,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
    pub resume_ref: String,
    pub cover_letter: Option<String>,
    pub status_history: Vec<StatusEntry>,
    pub thread: ThreadView,
    pub interview: Option<Interview>,
    pub viewer: Party,
}

/// Listing row
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationSummary {
    pub id: Uuid,
    pub job_id: Uuid,
    pub job_seeker_id: Uuid,
    pub employer_id: Uuid,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub message_count: usize,
    pub interview: Option<Interview>,
}

impl From<Application> for ApplicationSummary {
    fn from(app: Application) -> Self {
        Self {
            id: app.id,
            job_id: app.job_id,
            job_seeker_id: app.job_seeker_id,
            employer_id: app.employer_id,
            status: app.status,
            applied_at: app.applied_at,
            updated_at: app.updated_at,
            message_count: app.messages.len(),
            interview: app.interview,
        }
    }
}

/// LifecycleService implementation
pub struct LifecycleServiceImpl {
    applications: Arc<dyn ApplicationRepository>,
    jobs: Arc<dyn JobDirectory>,
    users: Arc<dyn UserDirectory>,
    publisher: Arc<dyn EventPublisher>,
    policy: TransitionPolicy,
}

impl LifecycleServiceImpl {
    pub fn new(
        applications: Arc<dyn ApplicationRepository>,
        jobs: Arc<dyn JobDirectory>,
        users: Arc<dyn UserDirectory>,
        publisher: Arc<dyn EventPublisher>,
        policy: TransitionPolicy,
    ) -> Self {
        Self {
            applications,
            jobs,
            users,
            publisher,
            policy,
        }
    }

    async fn load(&self, application_id: Uuid) -> Result<Application, ApplicationError> {
        self.applications
            .find_by_id(application_id)
            .await?
            .ok_or_else(|| ApplicationError::NotFound("Application".into()))
    }

    fn summaries(applications: Vec<Application>) -> Vec<ApplicationSummary> {
        applications.into_iter().map(ApplicationSummary::from).collect()
    }

    fn duplicate() -> ApplicationError {
        ApplicationError::Conflict("you have already applied for this job".into())
    }

    /// Request resume first, then the one on the profile; blanks don't count.
    fn resolve_resume(requested: Option<String>, profile: Option<&String>) -> Option<String> {
        requested
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .or_else(|| {
                profile
                    .map(|r| r.trim().to_string())
                    .filter(|r| !r.is_empty())
            })
    }
}

#[async_trait]
impl LifecycleService for LifecycleServiceImpl {
    async fn apply(&self, request: ApplyDto) -> Result<Application, ApplicationError> {
        let job = self
            .jobs
            .find_job(request.job_id)
            .await?
            .ok_or_else(|| ApplicationError::NotFound("Job".into()))?;

        let job_seeker = self
            .users
            .find_user(request.job_seeker_id)
            .await?
            .ok_or_else(|| ApplicationError::NotFound("User".into()))?;

        if job_seeker.role != UserRole::JobSeeker {
            return Err(ApplicationError::Forbidden(
                "only job seekers can apply".into(),
            ));
        }

        // Early answer for a repeat apply; the insert below still decides races.
        if self
            .applications
            .exists_for(job.id, job_seeker.id)
            .await?
        {
            return Err(Self::duplicate());
        }

        let resume_ref = Self::resolve_resume(request.resume_ref, job_seeker.resume_ref.as_ref())
            .ok_or_else(|| {
                ApplicationError::Validation(
                    "a resume is required: upload one or add it to your profile".into(),
                )
            })?;

        let application = Application::submit(
            job.id,
            job_seeker.id,
            job.employer_id,
            resume_ref,
            request.cover_letter.filter(|c| !c.trim().is_empty()),
        );

        // The store's uniqueness constraint is the authority on duplicates.
        self.applications
            .insert(&application)
            .await
            .map_err(|e| match ApplicationError::from(e) {
                ApplicationError::Conflict(_) => Self::duplicate(),
                other => other,
            })?;

        tracing::info!(
            application_id = %application.id,
            job_id = %job.id,
            job_seeker_id = %job_seeker.id,
            employer_id = %job.employer_id,
            "Application submitted"
        );

        self.publisher.publish(DomainEvent::application_submitted(
            &application,
            &job,
            &job_seeker,
        ));

        Ok(application)
    }

    async fn set_status(
        &self,
        application_id: Uuid,
        actor_id: Uuid,
        change: StatusChange,
    ) -> Result<Application, ApplicationError> {
        let application = self.load(application_id).await?;
        let party = require_party(&application, actor_id, self.users.as_ref()).await?;

        if party == Party::JobSeeker {
            return Err(ApplicationError::Forbidden(
                "only the employer or an admin can change the status".into(),
            ));
        }

        let entry = StatusEntry::new(change.status, actor_id)
            .with_notes(change.notes)
            .with_details(change.details);

        // The policy is checked by the store against the status it holds.
        let updated = self
            .applications
            .append_status(application_id, entry, self.policy)
            .await?;
        let from = updated
            .status_history
            .last()
            .and_then(|entry| entry.previous_status)
            .unwrap_or(application.status);

        tracing::info!(
            application_id = %application_id,
            actor_id = %actor_id,
            from = %from,
            to = %change.status,
            "Application status changed"
        );

        self.publisher
            .publish(DomainEvent::status_changed(&updated, actor_id));

        Ok(updated)
    }

    async fn get_application(
        &self,
        application_id: Uuid,
        viewer_id: Uuid,
        order: SortOrder,
    ) -> Result<ApplicationView, ApplicationError> {
        let application = self.load(application_id).await?;
        let viewer = require_party(&application, viewer_id, self.users.as_ref()).await?;
        let thread = project_thread(&application, viewer, self.users.as_ref(), order).await?;

        Ok(ApplicationView {
            id: application.id,
            job_id: application.job_id,
            job_seeker_id: application.job_seeker_id,
            employer_id: application.employer_id,
            status: application.status,
            applied_at: application.applied_at,
            status_history: application.history(order),
            resume_ref: application.resume_ref,
            cover_letter: application.cover_letter,
            thread,
            interview: application.interview,
            viewer,
        })
    }

    async fn authorize_viewer(
        &self,
        application_id: Uuid,
        viewer_id: Uuid,
    ) -> Result<Party, ApplicationError> {
        let application = self.load(application_id).await?;
        require_party(&application, viewer_id, self.users.as_ref()).await
    }

    async fn list_for_job(
        &self,
        job_id: Uuid,
        requester_id: Uuid,
    ) -> Result<Vec<ApplicationSummary>, ApplicationError> {
        let job = self
            .jobs
            .find_job(job_id)
            .await?
            .ok_or_else(|| ApplicationError::NotFound("Job".into()))?;

        if job.employer_id != requester_id && !is_admin(self.users.as_ref(), requester_id).await? {
            return Err(ApplicationError::Forbidden(
                "only the job's employer can list its applications".into(),
            ));
        }

        Ok(Self::summaries(self.applications.find_by_job(job_id).await?))
    }

    async fn list_mine(&self, job_seeker_id: Uuid) -> Result<Vec<ApplicationSummary>, ApplicationError> {
        Ok(Self::summaries(
            self.applications.find_by_job_seeker(job_seeker_id).await?,
        ))
    }

    async fn list_for_employer(
        &self,
        employer_id: Uuid,
        requester_id: Uuid,
    ) -> Result<Vec<ApplicationSummary>, ApplicationError> {
        if employer_id != requester_id && !is_admin(self.users.as_ref(), requester_id).await? {
            return Err(ApplicationError::Forbidden(
                "employers can only list their own applications".into(),
            ));
        }

        Ok(Self::summaries(
            self.applications.find_by_employer(employer_id).await?,
        ))
    }
}
