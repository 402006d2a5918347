//! Message entity.
//!
//! Maps to the `application_messages` table in the database schema.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::Party;

/// Role tag recorded on every message, matching the `role` TEXT column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Sent by the application's job seeker
    JobSeeker,
    /// Sent by the job's employer
    Employer,
    /// Generated by the service itself
    System,
}

impl MessageRole {
    /// Convert from database string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "jobseeker" => Some(Self::JobSeeker),
            "employer" => Some(Self::Employer),
            "system" => Some(Self::System),
            _ => None,
        }
    }

    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::JobSeeker => "jobseeker",
            Self::Employer => "employer",
            Self::System => "system",
        }
    }

    /// Role a party writes with. Admins cannot post to a thread.
    pub fn for_party(party: Party) -> Option<Self> {
        match party {
            Party::JobSeeker => Some(Self::JobSeeker),
            Party::Employer => Some(Self::Employer),
            Party::Admin => None,
        }
    }

    /// Role of the messages a party receives from the other side.
    pub fn counterpart_of(party: Party) -> Option<Self> {
        match party {
            Party::JobSeeker => Some(Self::Employer),
            Party::Employer => Some(Self::JobSeeker),
            Party::Admin => None,
        }
    }

    /// Whether `party` is an intended recipient of messages with this role.
    ///
    /// System messages are addressed to both sides.
    pub fn is_addressed_to(&self, party: Party) -> bool {
        match self {
            Self::JobSeeker => party == Party::Employer,
            Self::Employer => party == Party::JobSeeker,
            Self::System => party != Party::Admin,
        }
    }
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A message in an application's thread.
///
/// Maps to the `application_messages` table:
/// - id: UUID PRIMARY KEY
/// - application_id: UUID NOT NULL REFERENCES applications(id)
/// - seq: BIGSERIAL (insertion order)
/// - sender_id: UUID NOT NULL
/// - role: TEXT NOT NULL
/// - content: TEXT NOT NULL
/// - is_read: BOOLEAN NOT NULL DEFAULT FALSE
/// - created_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub content: String,
    pub sender_id: Uuid,
    pub role: MessageRole,
    pub timestamp: DateTime<Utc>,
    /// Only ever moves from false to true
    pub read: bool,
}

impl Message {
    /// Create an unread message stamped now.
    pub fn new(sender_id: Uuid, role: MessageRole, content: String) -> Self {
        Self {
            id: Uuid::now_v7(),
            content,
            sender_id,
            role,
            timestamp: Utc::now(),
            read: false,
        }
    }
}
