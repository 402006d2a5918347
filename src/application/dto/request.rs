//! Request DTOs
//!
//! Data structures for API request bodies and query strings.

use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::domain::{ApplicationStatus, InterviewStatus, InterviewType, SortOrder};

/// Apply request
#[derive(Debug, Deserialize, Validate)]
pub struct ApplyRequest {
    pub job_id: Uuid,

    /// Falls back to the resume on the job seeker's profile when omitted
    #[validate(length(max = 2048, message = "Resume reference must be at most 2048 characters"))]
    pub resume_ref: Option<String>,

    #[validate(length(max = 10000, message = "Cover letter must be at most 10000 characters"))]
    pub cover_letter: Option<String>,
}

/// Status change request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateStatusRequest {
    pub status: ApplicationStatus,

    #[validate(length(max = 2000, message = "Notes must be at most 2000 characters"))]
    pub notes: Option<String>,
}

/// Schedule interview request
#[derive(Debug, Deserialize, Validate)]
pub struct ScheduleInterviewRequest {
    pub date: NaiveDate,
    pub time: NaiveTime,

    #[validate(length(min = 1, max = 500, message = "Location must be 1-500 characters"))]
    pub location: String,

    #[serde(rename = "type")]
    pub interview_type: InterviewType,

    #[validate(length(max = 2000, message = "Notes must be at most 2000 characters"))]
    pub notes: Option<String>,
}

/// Interview patch request
#[derive(Debug, Default, Deserialize)]
pub struct UpdateInterviewRequest {
    pub status: Option<InterviewStatus>,
    pub confirmed: Option<bool>,
}

/// Send message request; length limits are enforced by the thread service
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub content: String,
}

/// Mark read request; an absent body marks the whole thread
#[derive(Debug, Default, Deserialize)]
pub struct MarkReadRequest {
    pub message_id: Option<Uuid>,
}

/// `?order=` query parameter.
///
/// `newest_first` (alias `desc`) or `oldest_first` (alias `asc`). An absent
/// parameter is resolved to newest first here, so services always receive
/// an explicit order.
#[derive(Debug, Deserialize)]
pub struct OrderQuery {
    #[serde(default = "OrderQuery::absent")]
    pub order: SortOrder,
}

impl OrderQuery {
    fn absent() -> SortOrder {
        SortOrder::NewestFirst
    }
}

/// Query for received applications; admins may name the employer
#[derive(Debug, Default, Deserialize)]
pub struct ReceivedQuery {
    pub employer_id: Option<Uuid>,
}
