//! # Domain Services
//!
//! Domain services encapsulate business rules that don't naturally belong
//! to a single entity.
//!
//! ## Services
//!
//! - **TransitionPolicy**: which application status changes are accepted

mod transition_policy;

pub use transition_policy::*;
