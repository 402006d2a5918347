//! In-memory backend
//!
//! DashMap implementations of the repository and directory traits for
//! development and tests. Selected with `storage.backend = "memory"`.

mod application_store;
mod directory;

pub use application_store::InMemoryApplicationRepository;
pub use directory::{DirectorySeed, InMemoryDirectory};
