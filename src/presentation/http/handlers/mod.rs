//! HTTP Handlers
//!
//! Request handlers for all HTTP endpoints.

pub mod application;
pub mod health;
pub mod interview;
pub mod message;
