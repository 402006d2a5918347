//! Application Services
//!
//! Business logic services that coordinate domain operations.
//!
//! ## Available Services
//!
//! - **LifecycleService**: Submission, status changes, reads and listings
//! - **ThreadService**: Per-application message threads and read marking
//! - **InterviewService**: Interview scheduling and updates
//! - **TokenVerifier**: Bearer credential verification

mod access;
pub mod auth_service;
pub mod interview_service;
pub mod lifecycle_service;
pub mod thread_service;

#[cfg(test)]
pub(crate) mod testing;

// Re-export auth service types
pub use auth_service::{AuthError, Claims, Identity, JwtTokenVerifier, TokenVerifier};

// Re-export lifecycle service types
pub use lifecycle_service::{
    ApplicationSummary, ApplicationView, ApplyDto, LifecycleService, LifecycleServiceImpl,
    StatusChange,
};

// Re-export thread service types
pub use thread_service::{SenderInfo, ThreadMessage, ThreadService, ThreadServiceImpl, ThreadView};

// Re-export interview service types
pub use interview_service::{InterviewPatch, InterviewService, InterviewServiceImpl};
