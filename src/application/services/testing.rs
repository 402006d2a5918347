//! Shared fixtures for service tests.

use std::sync::Arc;

use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use fake::Fake;
use parking_lot::Mutex;
use uuid::Uuid;

use super::interview_service::InterviewServiceImpl;
use super::lifecycle_service::{ApplyDto, LifecycleService, LifecycleServiceImpl};
use super::thread_service::ThreadServiceImpl;
use crate::application::events::{DomainEvent, EventKind, EventPublisher};
use crate::domain::services::TransitionPolicy;
use crate::domain::{Application, JobRecord, UserRecord, UserRole};
use crate::infrastructure::memory::{InMemoryApplicationRepository, InMemoryDirectory};

/// Publisher that keeps every event for later inspection.
#[derive(Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<DomainEvent>>,
}

impl RecordingPublisher {
    pub fn events(&self) -> Vec<DomainEvent> {
        self.events.lock().clone()
    }

    pub fn events_of(&self, kind: EventKind) -> Vec<DomainEvent> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.kind() == kind)
            .cloned()
            .collect()
    }
}

impl EventPublisher for RecordingPublisher {
    fn publish(&self, event: DomainEvent) {
        self.events.lock().push(event);
    }
}

pub fn user(role: UserRole, resume_ref: Option<&str>) -> UserRecord {
    UserRecord {
        id: Uuid::new_v4(),
        name: Name().fake(),
        email: SafeEmail().fake(),
        role,
        resume_ref: resume_ref.map(str::to_string),
    }
}

/// One employer with one job, one job seeker with a profile resume and an
/// admin, over the in-memory store.
pub struct Fixture {
    pub repo: Arc<InMemoryApplicationRepository>,
    pub directory: Arc<InMemoryDirectory>,
    pub publisher: Arc<RecordingPublisher>,
    pub seeker: UserRecord,
    pub employer: UserRecord,
    pub admin: UserRecord,
    pub job: JobRecord,
    pub max_message_length: usize,
}

impl Fixture {
    pub fn new() -> Self {
        let directory = Arc::new(InMemoryDirectory::new());
        let seeker = user(UserRole::JobSeeker, Some("profile-resume.pdf"));
        let employer = user(UserRole::Employer, None);
        let admin = user(UserRole::Admin, None);
        let job = JobRecord {
            id: Uuid::new_v4(),
            employer_id: employer.id,
            title: "Backend Engineer".into(),
        };

        directory.insert_user(seeker.clone());
        directory.insert_user(employer.clone());
        directory.insert_user(admin.clone());
        directory.insert_job(job.clone());

        Self {
            repo: Arc::new(InMemoryApplicationRepository::new()),
            directory,
            publisher: Arc::new(RecordingPublisher::default()),
            seeker,
            employer,
            admin,
            job,
            max_message_length: 200,
        }
    }

    pub fn add_job_seeker(&self, resume_ref: Option<&str>) -> UserRecord {
        let seeker = user(UserRole::JobSeeker, resume_ref);
        self.directory.insert_user(seeker.clone());
        seeker
    }

    pub fn apply_dto(&self, resume_ref: Option<&str>) -> ApplyDto {
        ApplyDto {
            job_id: self.job.id,
            job_seeker_id: self.seeker.id,
            resume_ref: resume_ref.map(str::to_string),
            cover_letter: None,
        }
    }

    /// Submit the default application.
    pub async fn apply(&self) -> Application {
        self.lifecycle()
            .apply(self.apply_dto(Some("r.pdf")))
            .await
            .expect("fixture application")
    }

    pub fn lifecycle(&self) -> LifecycleServiceImpl {
        self.lifecycle_with_policy(TransitionPolicy::Permissive)
    }

    pub fn lifecycle_with_policy(&self, policy: TransitionPolicy) -> LifecycleServiceImpl {
        LifecycleServiceImpl::new(
            self.repo.clone(),
            self.directory.clone(),
            self.directory.clone(),
            self.publisher.clone(),
            policy,
        )
    }

    pub fn threads(&self) -> ThreadServiceImpl {
        ThreadServiceImpl::new(
            self.repo.clone(),
            self.directory.clone(),
            self.publisher.clone(),
            self.max_message_length,
        )
    }

    pub fn interviews(&self) -> InterviewServiceImpl {
        InterviewServiceImpl::new(
            self.repo.clone(),
            self.directory.clone(),
            Arc::new(self.lifecycle()),
            self.publisher.clone(),
        )
    }
}
