//! Interview Service
//!
//! Scheduling and updating the single live interview of an application.
//! Scheduling from `pending` or `reviewed` moves the application to
//! `interviewed` through the lifecycle service.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::access::require_party;
use super::lifecycle_service::{LifecycleService, StatusChange};
use crate::application::error::ApplicationError;
use crate::application::events::{DomainEvent, EventPublisher};
use crate::domain::{
    Application, ApplicationRepository, ApplicationStatus, Interview, InterviewSlot,
    InterviewStatus, Party, UserDirectory,
};

/// Interview service trait
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InterviewService: Send + Sync {
    /// Schedule or reschedule the interview for an application
    async fn schedule(
        &self,
        application_id: Uuid,
        actor_id: Uuid,
        slot: InterviewSlot,
    ) -> Result<Application, ApplicationError>;

    /// Apply a confirmation or status patch to an interview
    async fn update_interview(
        &self,
        interview_id: Uuid,
        actor_id: Uuid,
        patch: InterviewPatch,
    ) -> Result<Interview, ApplicationError>;
}

/// Partial interview update
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InterviewPatch {
    /// Employer or admin only
    pub status: Option<InterviewStatus>,
    /// Job seeker only
    pub confirmed: Option<bool>,
}

impl InterviewPatch {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.confirmed.is_none()
    }
}

/// InterviewService implementation
pub struct InterviewServiceImpl {
    applications: Arc<dyn ApplicationRepository>,
    users: Arc<dyn UserDirectory>,
    lifecycle: Arc<dyn LifecycleService>,
    publisher: Arc<dyn EventPublisher>,
}

impl InterviewServiceImpl {
    pub fn new(
        applications: Arc<dyn ApplicationRepository>,
        users: Arc<dyn UserDirectory>,
        lifecycle: Arc<dyn LifecycleService>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            applications,
            users,
            lifecycle,
            publisher,
        }
    }

    async fn load(&self, application_id: Uuid) -> Result<Application, ApplicationError> {
        self.applications
            .find_by_id(application_id)
            .await?
            .ok_or_else(|| ApplicationError::NotFound("Application".into()))
    }

    /// Status change recorded when scheduling advances the application.
    fn scheduled_change(interview: &Interview) -> StatusChange {
        StatusChange::new(ApplicationStatus::Interviewed)
            .with_notes(Some(format!(
                "Interview scheduled for {} at {} ({})",
                interview.date,
                interview.time.format("%H:%M"),
                interview.interview_type.as_str()
            )))
            .with_details(serde_json::json!({
                "interview_id": interview.id,
                "date": interview.date,
                "time": interview.time,
                "location": interview.location,
                "type": interview.interview_type,
            }))
    }

    /// Parties told about an update: the side that did not make it, or both
    /// when an admin did.
    fn update_recipients(application: &Application, initiator: Party) -> Vec<Uuid> {
        match initiator {
            Party::Admin => vec![application.job_seeker_id, application.employer_id],
            party => party
                .counterpart()
                .and_then(|p| application.party_id(p))
                .into_iter()
                .collect(),
        }
    }
}

#[async_trait]
impl InterviewService for InterviewServiceImpl {
    async fn schedule(
        &self,
        application_id: Uuid,
        actor_id: Uuid,
        slot: InterviewSlot,
    ) -> Result<Application, ApplicationError> {
        if slot.location.trim().is_empty() {
            return Err(ApplicationError::Validation(
                "interview location is required".into(),
            ));
        }

        let application = self.load(application_id).await?;
        let party = require_party(&application, actor_id, self.users.as_ref()).await?;
        if party == Party::JobSeeker {
            return Err(ApplicationError::Forbidden(
                "only the employer or an admin can schedule interviews".into(),
            ));
        }

        let interview = Interview::schedule(application.id, slot, application.interview.as_ref());
        let mut updated = self.applications.save_interview(&interview).await?;

        tracing::info!(
            application_id = %application_id,
            interview_id = %interview.id,
            actor_id = %actor_id,
            rescheduled = application.interview.is_some(),
            "Interview scheduled"
        );

        // The interview is stored either way; a failed advance leaves the
        // status where it was.
        if updated.status.advances_on_interview() {
            match self
                .lifecycle
                .set_status(application_id, actor_id, Self::scheduled_change(&interview))
                .await
            {
                Ok(advanced) => updated = advanced,
                Err(e) => tracing::warn!(
                    application_id = %application_id,
                    interview_id = %interview.id,
                    error = %e,
                    "Interview scheduled without advancing status"
                ),
            }
        }

        self.publisher
            .publish(DomainEvent::interview_scheduled(&updated, interview));

        Ok(updated)
    }

    async fn update_interview(
        &self,
        interview_id: Uuid,
        actor_id: Uuid,
        patch: InterviewPatch,
    ) -> Result<Interview, ApplicationError> {
        if patch.is_empty() {
            return Err(ApplicationError::Validation(
                "provide a status or a confirmation".into(),
            ));
        }

        let interview = self
            .applications
            .find_interview(interview_id)
            .await?
            .ok_or_else(|| ApplicationError::NotFound("Interview".into()))?;
        let application = self.load(interview.application_id).await?;
        let party = require_party(&application, actor_id, self.users.as_ref()).await?;

        match party {
            Party::JobSeeker if patch.status.is_some() => {
                return Err(ApplicationError::Forbidden(
                    "job seekers can only confirm interviews".into(),
                ));
            }
            Party::Employer | Party::Admin if patch.confirmed.is_some() => {
                return Err(ApplicationError::Forbidden(
                    "only the job seeker can confirm an interview".into(),
                ));
            }
            _ => {}
        }

        // Only the patched field is written, so a concurrent update to the
        // other field or a reschedule is never rolled back.
        let updated = self
            .applications
            .update_interview(interview_id, patch.status, patch.confirmed, Utc::now())
            .await?;
        let interview = updated
            .interview
            .clone()
            .filter(|i| i.id == interview_id)
            .ok_or_else(|| ApplicationError::NotFound("Interview".into()))?;

        tracing::info!(
            interview_id = %interview_id,
            application_id = %interview.application_id,
            actor_id = %actor_id,
            status = %interview.status,
            confirmed = interview.job_seeker_confirmed,
            "Interview updated"
        );

        self.publisher.publish(DomainEvent::interview_updated(
            &updated,
            interview.clone(),
            actor_id,
            Self::update_recipients(&updated, party),
        ));

        Ok(interview)
    }
}
