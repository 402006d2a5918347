//! Application Handlers

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::application::dto::{
    ApplicationListResponse, ApplyRequest, OrderQuery, ReceivedQuery, UpdateStatusRequest,
};
use crate::application::services::{ApplicationView, ApplyDto, StatusChange};
use crate::domain::{Application, UserRole};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::validate_request;
use crate::startup::AppState;

/// Submit an application for the authenticated job seeker
pub async fn apply(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<ApplyRequest>,
) -> Result<(StatusCode, Json<Application>), AppError> {
    validate_request(&body)?;

    let application = state
        .lifecycle
        .apply(ApplyDto {
            job_id: body.job_id,
            job_seeker_id: auth.user_id,
            resume_ref: body.resume_ref,
            cover_letter: body.cover_letter,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(application)))
}

/// Applications the authenticated job seeker submitted
pub async fn list_mine(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ApplicationListResponse>, AppError> {
    let applications = state.lifecycle.list_mine(auth.user_id).await?;
    Ok(Json(applications.into()))
}

/// Applications for one job
pub async fn list_for_job(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<ApplicationListResponse>, AppError> {
    let applications = state.lifecycle.list_for_job(job_id, auth.user_id).await?;
    Ok(Json(applications.into()))
}

/// Applications received across an employer's jobs
pub async fn list_received(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<ReceivedQuery>,
) -> Result<Json<ApplicationListResponse>, AppError> {
    let employer_id = match (auth.role, query.employer_id) {
        (UserRole::Admin, Some(id)) => id,
        (UserRole::Admin, None) => {
            return Err(AppError::BadRequest("employer_id is required".into()))
        }
        (_, _) => auth.user_id,
    };

    let applications = state
        .lifecycle
        .list_for_employer(employer_id, auth.user_id)
        .await?;
    Ok(Json(applications.into()))
}

/// Get one application with its history, thread and interview
pub async fn get_application(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(application_id): Path<Uuid>,
    Query(query): Query<OrderQuery>,
) -> Result<Json<ApplicationView>, AppError> {
    let view = state
        .lifecycle
        .get_application(application_id, auth.user_id, query.order)
        .await?;
    Ok(Json(view))
}

/// Change the status of an application
pub async fn set_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(application_id): Path<Uuid>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Json<Application>, AppError> {
    validate_request(&body)?;

    let application = state
        .lifecycle
        .set_status(
            application_id,
            auth.user_id,
            StatusChange::new(body.status).with_notes(body.notes),
        )
        .await?;

    Ok(Json(application))
}
