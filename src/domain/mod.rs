//! # Domain Layer
//!
//! The domain layer contains the core business rules of the application hub.
//! It is independent of any external frameworks or infrastructure concerns.
//!
//! ## Structure
//!
//! - **entities**: Application aggregate, messages, interviews and the
//!   collaborator records read from other services
//! - **value_objects**: Immutable value types (Party, SortOrder)
//! - **services**: Domain services for rules spanning entities
//!
//! ## Design Principles
//!
//! - No dependencies on infrastructure or presentation layers
//! - Repository traits define data access contracts
//! - Entities encapsulate domain behavior

pub mod entities;
pub mod services;
pub mod value_objects;

// Re-export commonly used types
pub use entities::*;
pub use value_objects::*;
