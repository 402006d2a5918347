//! Repository Implementations
//!
//! PostgreSQL implementations of domain repository traits.
//!
//! ## Available Repositories
//!
//! - **PgApplicationRepository** - Applications with history, messages and interviews
//! - **PgDirectory** - Read-only user and job lookups
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use sqlx::PgPool;
//! use crate::infrastructure::repositories::{PgApplicationRepository, PgDirectory};
//!
//! async fn setup_repositories(pool: PgPool) {
//!     let applications = PgApplicationRepository::new(pool.clone());
//!     let directory = PgDirectory::new(pool);
//! }
//! ```

pub mod application_repository;
pub mod directory_repository;

pub use application_repository::PgApplicationRepository;
pub use directory_repository::PgDirectory;
