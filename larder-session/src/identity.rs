//! Session identity.

use larder_core::{RecipeBackend, UserKey};

/// Ask the backend who the session belongs to.
///
/// Any failure, or an anonymous session, resolves to the guest.
pub async fn resolve_user<B>(backend: &B) -> UserKey
where
    B: RecipeBackend + ?Sized,
{
    match backend.whoami().await {
        Ok(Some(name)) => UserKey::user(name),
        Ok(None) => UserKey::Guest,
        Err(err) => {
            tracing::warn!(error = %err, "Could not resolve session user, continuing as guest");
            UserKey::Guest
        }
    }
}
