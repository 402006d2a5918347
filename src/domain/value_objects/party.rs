//! Party value object.

use serde::{Deserialize, Serialize};

/// The capacity in which a user acts on an application.
///
/// `JobSeeker` and `Employer` are resolved from the application itself;
/// `Admin` is granted by the user's role and is never a thread participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Party {
    JobSeeker,
    Employer,
    Admin,
}

impl Party {
    /// The other side of the application, if this is one of the two sides.
    pub fn counterpart(&self) -> Option<Party> {
        match self {
            Party::JobSeeker => Some(Party::Employer),
            Party::Employer => Some(Party::JobSeeker),
            Party::Admin => None,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Party::Admin)
    }
}
