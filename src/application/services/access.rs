//! Actor resolution shared by the application services.

use uuid::Uuid;

use crate::application::error::ApplicationError;
use crate::domain::{Application, Party, UserDirectory};

/// Resolve the capacity in which `actor_id` acts on `application`.
///
/// The two parties are matched by id; anyone else is looked up and
/// accepted only with the admin role.
pub(crate) async fn resolve_party(
    application: &Application,
    actor_id: Uuid,
    users: &dyn UserDirectory,
) -> Result<Option<Party>, ApplicationError> {
    if let Some(party) = application.party_of(actor_id) {
        return Ok(Some(party));
    }
    Ok(is_admin(users, actor_id).await?.then_some(Party::Admin))
}

/// Like [`resolve_party`] but rejects outsiders.
pub(crate) async fn require_party(
    application: &Application,
    actor_id: Uuid,
    users: &dyn UserDirectory,
) -> Result<Party, ApplicationError> {
    resolve_party(application, actor_id, users)
        .await?
        .ok_or_else(|| {
            ApplicationError::Forbidden("not a party to this application".to_string())
        })
}

pub(crate) async fn is_admin(
    users: &dyn UserDirectory,
    user_id: Uuid,
) -> Result<bool, ApplicationError> {
    Ok(users
        .find_user(user_id)
        .await?
        .map(|u| u.is_admin())
        .unwrap_or(false))
}
