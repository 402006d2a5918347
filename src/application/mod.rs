//! Application Layer
//!
//! Contains business logic services, domain events and data transfer
//! objects (DTOs). This layer orchestrates the flow of data between the
//! presentation and domain layers.

pub mod dto;
pub mod error;
pub mod events;
pub mod services;

pub use error::ApplicationError;
pub use events::{Channel, DomainEvent, EventKind, EventPublisher};
