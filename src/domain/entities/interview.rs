//! Interview entity.
//!
//! Maps to the `interviews` table. `application_id` is UNIQUE, so an
//! application has at most one live interview; rescheduling overwrites it.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InterviewType {
    InPerson,
    Phone,
    Video,
}

impl InterviewType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "in-person" => Some(Self::InPerson),
            "phone" => Some(Self::Phone),
            "video" => Some(Self::Video),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InPerson => "in-person",
            Self::Phone => "phone",
            Self::Video => "video",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InterviewStatus {
    #[default]
    Scheduled,
    Completed,
    Cancelled,
    Rescheduled,
}

impl InterviewStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "scheduled" => Some(Self::Scheduled),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            "rescheduled" => Some(Self::Rescheduled),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Rescheduled => "rescheduled",
        }
    }
}

impl std::fmt::Display for InterviewStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The live interview attached to an application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interview {
    pub id: Uuid,
    pub application_id: Uuid,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub location: String,
    #[serde(rename = "type")]
    pub interview_type: InterviewType,
    pub notes: Option<String>,
    pub status: InterviewStatus,
    pub job_seeker_confirmed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Scheduling details supplied by the employer.
#[derive(Debug, Clone)]
pub struct InterviewSlot {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub location: String,
    pub interview_type: InterviewType,
    pub notes: Option<String>,
}

impl Interview {
    /// Schedule a new interview, or overwrite `existing` keeping its id.
    ///
    /// Either way the result is `scheduled` and unconfirmed.
    pub fn schedule(application_id: Uuid, slot: InterviewSlot, existing: Option<&Interview>) -> Self {
        let now = Utc::now();
        Self {
            id: existing.map(|i| i.id).unwrap_or_else(Uuid::now_v7),
            application_id,
            date: slot.date,
            time: slot.time,
            location: slot.location,
            interview_type: slot.interview_type,
            notes: slot.notes,
            status: InterviewStatus::Scheduled,
            job_seeker_confirmed: false,
            created_at: existing.map(|i| i.created_at).unwrap_or(now),
            updated_at: now,
        }
    }
}
