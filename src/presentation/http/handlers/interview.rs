//! Interview Handlers

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::application::dto::{ScheduleInterviewRequest, UpdateInterviewRequest};
use crate::application::services::InterviewPatch;
use crate::domain::{Application, Interview, InterviewSlot};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::validate_request;
use crate::startup::AppState;

/// Schedule or reschedule the interview for an application
pub async fn schedule(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(application_id): Path<Uuid>,
    Json(body): Json<ScheduleInterviewRequest>,
) -> Result<(StatusCode, Json<Application>), AppError> {
    validate_request(&body)?;

    let slot = InterviewSlot {
        date: body.date,
        time: body.time,
        location: body.location,
        interview_type: body.interview_type,
        notes: body.notes,
    };

    let application = state
        .interviews
        .schedule(application_id, auth.user_id, slot)
        .await?;

    Ok((StatusCode::CREATED, Json(application)))
}

/// Update interview status or confirmation
pub async fn update_interview(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(interview_id): Path<Uuid>,
    Json(body): Json<UpdateInterviewRequest>,
) -> Result<Json<Interview>, AppError> {
    let patch = InterviewPatch {
        status: body.status,
        confirmed: body.confirmed,
    };
    let interview = state
        .interviews
        .update_interview(interview_id, auth.user_id, patch)
        .await?;

    Ok(Json(interview))
}
