//! Status transition domain service.

use serde::Deserialize;

use crate::domain::entities::ApplicationStatus;
use crate::shared::error::AppError;

/// Which status changes `SetStatus` accepts.
///
/// `Permissive` (the default) allows any status to follow any other,
/// including itself. `Strict` only allows the edges listed in
/// [`TransitionPolicy::strict_targets`]:
///
/// ```text
/// pending     -> reviewed | interviewed | accepted | rejected
/// reviewed    -> pending | interviewed | accepted | rejected
/// interviewed -> reviewed | interviewed | accepted | rejected
/// accepted    -> (terminal)
/// rejected    -> reviewed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionPolicy {
    #[default]
    Permissive,
    Strict,
}

impl TransitionPolicy {
    /// Check whether `from -> to` is allowed under this policy.
    pub fn allows(&self, from: ApplicationStatus, to: ApplicationStatus) -> bool {
        match self {
            TransitionPolicy::Permissive => true,
            TransitionPolicy::Strict => Self::strict_targets(from).contains(&to),
        }
    }

    /// Like [`allows`](Self::allows), as a validation error.
    pub fn check(&self, from: ApplicationStatus, to: ApplicationStatus) -> Result<(), AppError> {
        if self.allows(from, to) {
            Ok(())
        } else {
            Err(AppError::Validation(format!(
                "cannot move an application from {} to {}",
                from, to
            )))
        }
    }

    /// Edges of the strict transition table.
    pub fn strict_targets(from: ApplicationStatus) -> &'static [ApplicationStatus] {
        use ApplicationStatus::*;

        match from {
            Pending => &[Reviewed, Interviewed, Accepted, Rejected],
            Reviewed => &[Pending, Interviewed, Accepted, Rejected],
            // Re-entering interviewed records a rescheduled round.
            Interviewed => &[Reviewed, Interviewed, Accepted, Rejected],
            Accepted => &[],
            Rejected => &[Reviewed],
        }
    }
}
