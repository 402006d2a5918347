//! Domain Events
//!
//! Events emitted by the application services after a write is durable, and
//! the publisher seam that carries them to connected clients.
//!
//! Each logical event has one canonical name and zero or more legacy
//! aliases. Publishers emit every name so old and new subscribers both
//! receive it; services never deal with names at all.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{
    Application, ApplicationStatus, Interview, JobRecord, Message, UserRecord, UserRole,
};

/// Logical event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    ApplicationSubmitted,
    ApplicationStatusChanged,
    MessageNew,
    InterviewScheduled,
    InterviewUpdated,
}

impl EventKind {
    /// Canonical event name
    pub fn canonical_name(&self) -> &'static str {
        self.names()[0]
    }

    /// Every wire name for this event, canonical first.
    pub fn names(&self) -> &'static [&'static str] {
        match self {
            EventKind::ApplicationSubmitted => {
                &["application.submitted", "newApplication", "application:new"]
            }
            EventKind::ApplicationStatusChanged => &[
                "application.status_changed",
                "applicationStatusUpdated",
                "application:status",
            ],
            EventKind::MessageNew => &["message.new", "newMessage", "application:message"],
            EventKind::InterviewScheduled => &["interview.scheduled", "interviewScheduled"],
            EventKind::InterviewUpdated => &["interview.updated", "interviewUpdated"],
        }
    }
}

/// A fan-out target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Every connection of one user, joined automatically on connect
    User(Uuid),
    /// Every connection of users with a role, joined automatically on connect
    Role(UserRole),
    /// Connections that explicitly joined one application
    Application(Uuid),
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Channel::User(id) => write!(f, "user:{}", id),
            Channel::Role(role) => write!(f, "role:{}", role),
            Channel::Application(id) => write!(f, "application:{}", id),
        }
    }
}

/// Domain events with their payloads.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum DomainEvent {
    ApplicationSubmitted(ApplicationSubmittedEvent),
    ApplicationStatusChanged(StatusChangedEvent),
    MessageNew(MessageNewEvent),
    InterviewScheduled(InterviewScheduledEvent),
    InterviewUpdated(InterviewUpdatedEvent),
}

impl DomainEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            DomainEvent::ApplicationSubmitted(_) => EventKind::ApplicationSubmitted,
            DomainEvent::ApplicationStatusChanged(_) => EventKind::ApplicationStatusChanged,
            DomainEvent::MessageNew(_) => EventKind::MessageNew,
            DomainEvent::InterviewScheduled(_) => EventKind::InterviewScheduled,
            DomainEvent::InterviewUpdated(_) => EventKind::InterviewUpdated,
        }
    }

    /// The application this event concerns
    pub fn application_id(&self) -> Uuid {
        match self {
            DomainEvent::ApplicationSubmitted(e) => e.application_id,
            DomainEvent::ApplicationStatusChanged(e) => e.application_id,
            DomainEvent::MessageNew(e) => e.application_id,
            DomainEvent::InterviewScheduled(e) => e.application_id,
            DomainEvent::InterviewUpdated(e) => e.application_id,
        }
    }

    /// Channels this event is addressed to.
    pub fn channels(&self) -> Vec<Channel> {
        match self {
            DomainEvent::ApplicationSubmitted(e) => vec![Channel::User(e.employer_id)],
            DomainEvent::ApplicationStatusChanged(e) => vec![Channel::User(e.job_seeker_id)],
            DomainEvent::MessageNew(e) => vec![
                Channel::User(e.recipient_id),
                Channel::Application(e.application_id),
            ],
            DomainEvent::InterviewScheduled(e) => vec![Channel::User(e.job_seeker_id)],
            DomainEvent::InterviewUpdated(e) => {
                e.recipients.iter().copied().map(Channel::User).collect()
            }
        }
    }

    /// Payload sent to clients
    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    pub fn application_submitted(
        application: &Application,
        job: &JobRecord,
        job_seeker: &UserRecord,
    ) -> Self {
        DomainEvent::ApplicationSubmitted(ApplicationSubmittedEvent {
            application_id: application.id,
            job_id: application.job_id,
            job_title: job.title.clone(),
            job_seeker_id: application.job_seeker_id,
            job_seeker_name: job_seeker.name.clone(),
            employer_id: application.employer_id,
            status: application.status,
            applied_at: application.applied_at,
        })
    }

    pub fn status_changed(application: &Application, changed_by: Uuid) -> Self {
        let latest = application.status_history.last();
        DomainEvent::ApplicationStatusChanged(StatusChangedEvent {
            application_id: application.id,
            job_id: application.job_id,
            job_seeker_id: application.job_seeker_id,
            status: application.status,
            previous_status: latest.and_then(|e| e.previous_status),
            notes: latest.and_then(|e| e.notes.clone()),
            changed_by,
            changed_at: latest.map(|e| e.timestamp).unwrap_or_else(Utc::now),
        })
    }

    pub fn message_new(application_id: Uuid, message: Message, recipient_id: Uuid) -> Self {
        DomainEvent::MessageNew(MessageNewEvent {
            application_id,
            message,
            recipient_id,
        })
    }

    pub fn interview_scheduled(application: &Application, interview: Interview) -> Self {
        DomainEvent::InterviewScheduled(InterviewScheduledEvent {
            application_id: application.id,
            job_id: application.job_id,
            job_seeker_id: application.job_seeker_id,
            interview,
        })
    }

    pub fn interview_updated(
        application: &Application,
        interview: Interview,
        updated_by: Uuid,
        recipients: Vec<Uuid>,
    ) -> Self {
        DomainEvent::InterviewUpdated(InterviewUpdatedEvent {
            application_id: application.id,
            job_id: application.job_id,
            interview,
            updated_by,
            recipients,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplicationSubmittedEvent {
    pub application_id: Uuid,
    pub job_id: Uuid,
    pub job_title: String,
    pub job_seeker_id: Uuid,
    pub job_seeker_name: String,
    pub employer_id: Uuid,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusChangedEvent {
    pub application_id: Uuid,
    pub job_id: Uuid,
    pub job_seeker_id: Uuid,
    pub status: ApplicationStatus,
    pub previous_status: Option<ApplicationStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub changed_by: Uuid,
    pub changed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageNewEvent {
    pub application_id: Uuid,
    pub message: Message,
    pub recipient_id: Uuid,
}

#[derive(Debug, Clone, Serialize)]
pub struct InterviewScheduledEvent {
    pub application_id: Uuid,
    pub job_id: Uuid,
    pub job_seeker_id: Uuid,
    pub interview: Interview,
}

#[derive(Debug, Clone, Serialize)]
pub struct InterviewUpdatedEvent {
    pub application_id: Uuid,
    pub job_id: Uuid,
    pub interview: Interview,
    pub updated_by: Uuid,
    #[serde(skip)]
    pub recipients: Vec<Uuid>,
}

/// Façade the services publish through.
///
/// Publishing is fire-and-forget: implementations catch and log transport
/// failures and never report them to the caller. Events are only published
/// after the originating write has been stored.
#[cfg_attr(test, mockall::automock)]
pub trait EventPublisher: Send + Sync {
    fn publish(&self, event: DomainEvent);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_canonical_name_comes_first() {
        assert_eq!(
            EventKind::ApplicationSubmitted.canonical_name(),
            "application.submitted"
        );
        assert_eq!(EventKind::InterviewUpdated.names(), &["interview.updated", "interviewUpdated"]);
    }

    #[test]
    fn test_message_new_targets_recipient_and_application() {
        let app_id = Uuid::new_v4();
        let recipient = Uuid::new_v4();
        let message = Message::new(Uuid::new_v4(), crate::domain::MessageRole::JobSeeker, "Hi".into());
        let event = DomainEvent::message_new(app_id, message, recipient);

        assert_eq!(
            event.channels(),
            vec![Channel::User(recipient), Channel::Application(app_id)]
        );
    }

    #[test]
    fn test_submitted_payload_carries_job_id() {
        let job = JobRecord {
            id: Uuid::new_v4(),
            employer_id: Uuid::new_v4(),
            title: "Backend Engineer".into(),
        };
        let seeker = UserRecord {
            id: Uuid::new_v4(),
            name: "Sam".into(),
            email: "sam@example.com".into(),
            role: UserRole::JobSeeker,
            resume_ref: None,
        };
        let app = Application::submit(job.id, seeker.id, job.employer_id, "r.pdf".into(), None);
        let event = DomainEvent::application_submitted(&app, &job, &seeker);
        let json = event.to_json().unwrap();

        assert_eq!(json["job_id"], job.id.to_string());
        assert_eq!(json["status"], "pending");
        assert_eq!(event.channels(), vec![Channel::User(job.employer_id)]);
    }

    #[test]
    fn test_recipients_are_not_serialized() {
        let app = Application::submit(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), "r".into(), None);
        let interview = Interview::schedule(
            app.id,
            crate::domain::InterviewSlot {
                date: chrono::NaiveDate::from_ymd_opt(2026, 1, 2).unwrap(),
                time: chrono::NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
                location: "Zoom".into(),
                interview_type: crate::domain::InterviewType::Video,
                notes: None,
            },
            None,
        );
        let event = DomainEvent::interview_updated(&app, interview, app.employer_id, vec![app.job_seeker_id]);
        let json = event.to_json().unwrap();

        assert!(json.get("recipients").is_none());
        assert_eq!(event.channels(), vec![Channel::User(app.job_seeker_id)]);
    }
}
