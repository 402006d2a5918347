//! # Domain Entities
//!
//! Core domain entities of the application hub.
//!
//! ## Owned Entities
//!
//! - **Application**: one job seeker's submission against one job, with its
//!   status history, message thread and live interview
//! - **Message**: an entry in an application's thread
//! - **Interview**: the single live interview attached to an application
//!
//! ## Collaborator Records
//!
//! - **JobRecord**: job posting fields needed for authorization
//! - **UserRecord**: profile fields needed for authorization and display
//!
//! ## Repository Traits
//!
//! `ApplicationRepository` is the write model. `JobDirectory` and
//! `UserDirectory` are read-only views of data owned by other services.
//! All three are implemented in the infrastructure layer.

mod application;
mod interview;
mod job;
mod message;
mod user;

pub use application::{Application, ApplicationRepository, ApplicationStatus, StatusEntry};
pub use interview::{Interview, InterviewSlot, InterviewStatus, InterviewType};
pub use job::{JobDirectory, JobRecord};
pub use message::{Message, MessageRole};
pub use user::{UserDirectory, UserRecord, UserRole};

#[cfg(test)]
pub use job::MockJobDirectory;
#[cfg(test)]
pub use user::MockUserDirectory;
