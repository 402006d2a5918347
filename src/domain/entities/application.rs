//! Application entity and repository trait.
//!
//! Maps to the `applications` table plus its `application_status_history`,
//! `application_messages` and `interviews` child tables.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::interview::{Interview, InterviewStatus};
use super::message::{Message, MessageRole};
use crate::domain::services::TransitionPolicy;
use crate::domain::value_objects::{Party, SortOrder};
use crate::shared::error::AppError;

/// Application status matching the `status` TEXT column.
///
/// Any status may follow any other unless a strict
/// [`TransitionPolicy`](crate::domain::services::TransitionPolicy) is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    /// Submitted, not yet looked at
    #[default]
    Pending,
    /// Seen by the employer
    Reviewed,
    /// An interview has been scheduled
    Interviewed,
    /// Offer extended
    Accepted,
    /// Declined by the employer
    Rejected,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 5] = [
        Self::Pending,
        Self::Reviewed,
        Self::Interviewed,
        Self::Accepted,
        Self::Rejected,
    ];

    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Reviewed => "reviewed",
            Self::Interviewed => "interviewed",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }

    /// Statuses from which scheduling an interview advances the application.
    pub fn advances_on_interview(&self) -> bool {
        matches!(self, Self::Pending | Self::Reviewed)
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s.to_lowercase())
            .ok_or_else(|| format!("unknown application status '{}'", s))
    }
}

/// One immutable row of the status audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEntry {
    pub status: ApplicationStatus,
    pub timestamp: DateTime<Utc>,
    pub actor_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_status: Option<ApplicationStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl StatusEntry {
    pub fn new(status: ApplicationStatus, actor_id: Uuid) -> Self {
        Self {
            status,
            timestamp: Utc::now(),
            actor_id,
            notes: None,
            previous_status: None,
            details: None,
        }
    }

    pub fn with_notes(mut self, notes: Option<String>) -> Self {
        self.notes = notes;
        self
    }

    pub fn with_details(mut self, details: Option<serde_json::Value>) -> Self {
        self.details = details;
        self
    }
}

/// One job seeker's submission against one job.
///
/// Maps to the `applications` table:
/// - id: UUID PRIMARY KEY
/// - job_id / job_seeker_id: UUID NOT NULL, UNIQUE (job_id, job_seeker_id)
/// - employer_id: UUID NOT NULL (copied from the job at submission)
/// - status: TEXT NOT NULL DEFAULT 'pending'
/// - resume_ref: TEXT NOT NULL
/// - cover_letter: TEXT NULL
/// - applied_at / updated_at: TIMESTAMPTZ NOT NULL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Application {
    pub id: Uuid,
    pub job_id: Uuid,
    pub job_seeker_id: Uuid,
    pub employer_id: Uuid,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
    pub resume_ref: String,
    pub cover_letter: Option<String>,

    /// Audit trail in insertion order
    pub status_history: Vec<StatusEntry>,

    /// Conversation thread in insertion order
    pub messages: Vec<Message>,

    /// The single live interview, if one was scheduled
    pub interview: Option<Interview>,

    pub updated_at: DateTime<Utc>,
}

impl Application {
    /// Build a freshly submitted application with its seed status entry.
    pub fn submit(
        job_id: Uuid,
        job_seeker_id: Uuid,
        employer_id: Uuid,
        resume_ref: String,
        cover_letter: Option<String>,
    ) -> Self {
        let now = Utc::now();
        let seed = StatusEntry {
            status: ApplicationStatus::Pending,
            timestamp: now,
            actor_id: job_seeker_id,
            notes: Some("Application submitted".to_string()),
            previous_status: None,
            details: None,
        };

        Self {
            id: Uuid::now_v7(),
            job_id,
            job_seeker_id,
            employer_id,
            status: ApplicationStatus::Pending,
            applied_at: now,
            resume_ref,
            cover_letter,
            status_history: vec![seed],
            messages: Vec::new(),
            interview: None,
            updated_at: now,
        }
    }

    /// Which side of the application a user is on. Admins are not parties.
    pub fn party_of(&self, user_id: Uuid) -> Option<Party> {
        if user_id == self.job_seeker_id {
            Some(Party::JobSeeker)
        } else if user_id == self.employer_id {
            Some(Party::Employer)
        } else {
            None
        }
    }

    /// User id of the given party, if the party is one of the two sides.
    pub fn party_id(&self, party: Party) -> Option<Uuid> {
        match party {
            Party::JobSeeker => Some(self.job_seeker_id),
            Party::Employer => Some(self.employer_id),
            Party::Admin => None,
        }
    }

    /// Status history in the requested display order.
    pub fn history(&self, order: SortOrder) -> Vec<StatusEntry> {
        order.arrange(self.status_history.clone())
    }

    /// Unread messages addressed to `party` by its counterpart.
    pub fn unread_count_for(&self, party: Party) -> usize {
        let Some(counterpart) = MessageRole::counterpart_of(party) else {
            return 0;
        };
        self.messages
            .iter()
            .filter(|m| !m.read && m.role == counterpart)
            .count()
    }
}

/// Repository trait for Application data access operations.
///
/// Every mutating method is a single atomic store operation. Callers never
/// write back a whole aggregate they read earlier, so concurrent writers can
/// race on `status` but never lose an audit row or a message.
#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    /// Insert a new application with its seed history.
    ///
    /// Returns `AppError::Conflict` when an application for the same
    /// `(job_id, job_seeker_id)` pair already exists.
    async fn insert(&self, application: &Application) -> Result<(), AppError>;

    /// Whether an application exists for the `(job_id, job_seeker_id)` pair.
    async fn exists_for(&self, job_id: Uuid, job_seeker_id: Uuid) -> Result<bool, AppError>;

    /// Find an application with its history, messages and interview.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Application>, AppError>;

    /// Applications submitted against a job, newest first.
    async fn find_by_job(&self, job_id: Uuid) -> Result<Vec<Application>, AppError>;

    /// Applications submitted by a job seeker, newest first.
    async fn find_by_job_seeker(&self, job_seeker_id: Uuid) -> Result<Vec<Application>, AppError>;

    /// Applications received across all of an employer's jobs, newest first.
    async fn find_by_employer(&self, employer_id: Uuid) -> Result<Vec<Application>, AppError>;

    /// Set the current status and append `entry` to the history.
    ///
    /// `policy` is checked against the status stored at the moment of the
    /// write, under the same lock, and a refused move returns
    /// `AppError::Validation`. `entry.previous_status` is overwritten with
    /// that stored status.
    async fn append_status(
        &self,
        id: Uuid,
        entry: StatusEntry,
        policy: TransitionPolicy,
    ) -> Result<Application, AppError>;

    /// Append a message after marking every earlier unread message with
    /// role `mark_read_role` as read.
    async fn append_message(
        &self,
        id: Uuid,
        message: &Message,
        mark_read_role: Option<MessageRole>,
    ) -> Result<Application, AppError>;

    /// Mark the given messages read. Returns how many changed from unread.
    async fn mark_messages_read(&self, id: Uuid, message_ids: &[Uuid]) -> Result<u64, AppError>;

    /// Write the live interview to both the interview record and the
    /// application's embedded copy.
    async fn save_interview(&self, interview: &Interview) -> Result<Application, AppError>;

    /// Change only the given fields of an interview, leaving the rest as
    /// stored. Returns `AppError::NotFound` for an unknown interview.
    async fn update_interview(
        &self,
        interview_id: Uuid,
        status: Option<InterviewStatus>,
        confirmed: Option<bool>,
        updated_at: DateTime<Utc>,
    ) -> Result<Application, AppError>;

    /// Find an interview by its own id.
    async fn find_interview(&self, interview_id: Uuid) -> Result<Option<Interview>, AppError>;

    /// Cheap connectivity probe used by readiness checks.
    async fn ping(&self) -> Result<(), AppError>;
}
