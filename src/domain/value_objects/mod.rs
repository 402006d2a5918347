//! # Domain Value Objects
//!
//! Immutable value types that represent domain concepts without identity.
//!
//! ## Value Objects
//!
//! - **Party**: which side of an application a user acts for
//! - **SortOrder**: explicit display order for histories and threads

mod party;
mod sort_order;

pub use party::*;
pub use sort_order::*;
