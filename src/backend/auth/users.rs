/**
 * User Lookup for Login
 *
 * Login doubles as signup: the first login for an email creates the user.
 */

use crate::backend::error::{BackendError, BackendResult};
use crate::backend::store::UserStore;
use crate::shared::user::validated_email;
use crate::shared::User;

/// Display name used when a login omits one: the email's local part
pub fn default_name(email: &str) -> String {
    email.split('@').next().unwrap_or(email).to_string()
}

/// Find the user for `email`, creating it when absent
///
/// # Arguments
///
/// * `users` - User store
/// * `email` - Raw email; normalized and validated here
/// * `name` - Display name for a newly created user
///
/// # Returns
///
/// The existing or created user. A concurrent login that creates the same
/// user first is not an error: the unique constraint fires and the winner's
/// row is read back.
pub async fn find_or_create_user<U>(users: &U, email: &str, name: &str) -> BackendResult<User>
where
    U: UserStore + ?Sized,
{
    let email = validated_email(email)?;

    if let Some(user) = users.get_user_by_email(&email).await? {
        return Ok(user);
    }

    let name = match name.trim() {
        "" => default_name(&email),
        trimmed => trimmed.to_string(),
    };

    match users.create_user(&name, &email).await {
        Ok(user) => {
            tracing::info!("[Auth] Created user {} ({})", user.id, user.email);
            Ok(user)
        }
        Err(BackendError::Conflict { .. }) => users
            .get_user_by_email(&email)
            .await?
            .ok_or_else(|| BackendError::internal(format!("user {} vanished after conflict", email))),
        Err(e) => Err(e),
    }
}
