//! Application service errors.

use crate::shared::error::AppError;

/// Caller-facing errors returned by the lifecycle, thread and interview
/// services. Notification failures never appear here.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApplicationError {
    /// Missing or invalid input
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Job, user, application, message or interview absent
    #[error("{0} not found")]
    NotFound(String),

    /// Actor is neither a party to the application nor an admin
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// Duplicate application for the same job and job seeker
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<AppError> for ApplicationError {
    fn from(error: AppError) -> Self {
        match error {
            AppError::NotFound(what) => ApplicationError::NotFound(what),
            AppError::Conflict(msg) => ApplicationError::Conflict(msg),
            AppError::Validation(msg)
            | AppError::BadRequest(msg)
            | AppError::InvalidFields { message: msg, .. } => ApplicationError::Validation(msg),
            AppError::Forbidden(msg) | AppError::Unauthorized(msg) => {
                ApplicationError::Forbidden(msg)
            }
            e => ApplicationError::Internal(e.to_string()),
        }
    }
}

impl From<ApplicationError> for AppError {
    fn from(error: ApplicationError) -> Self {
        match error {
            ApplicationError::Validation(msg) => AppError::Validation(msg),
            ApplicationError::NotFound(what) => AppError::NotFound(format!("{} not found", what)),
            ApplicationError::Forbidden(msg) => AppError::Forbidden(msg),
            ApplicationError::Conflict(msg) => AppError::Conflict(msg),
            ApplicationError::Internal(msg) => AppError::Internal(msg),
        }
    }
}
