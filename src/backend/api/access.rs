/**
 * Access Checks and Parameter Parsing
 *
 * Membership checks shared by the session, group, submission and websocket
 * handlers. Emails compared here come from the access token and are
 * already normalized.
 */

use crate::backend::error::{BackendError, BackendResult};
use crate::backend::store::{GroupStore, SessionStore, Store};
use crate::shared::{Group, GroupId, Session, SessionId};

/// Load a group and require `email` to be one of its members
///
/// # Errors
///
/// * `NotFound` - The group does not exist
/// * `Forbidden` - `email` is not an allowed member
pub async fn require_group_member(
    store: &dyn Store,
    group_id: GroupId,
    email: &str,
) -> BackendResult<Group> {
    let group = store
        .get_group(group_id)
        .await?
        .ok_or_else(|| BackendError::not_found(format!("group {} not found", group_id)))?;

    if !group.contains_email(email) {
        tracing::info!("[Server] {} is not a member of group {}", email, group_id);
        return Err(BackendError::forbidden("not a member of this group"));
    }
    Ok(group)
}

/// Load a session and require `email` to belong to its group
///
/// # Errors
///
/// * `NotFound` - The session does not exist
/// * `Forbidden` - `email` is not a member of the session's group
pub async fn require_session_member(
    store: &dyn Store,
    session_id: SessionId,
    email: &str,
) -> BackendResult<Session> {
    let session = store
        .get_session(session_id)
        .await?
        .ok_or_else(|| BackendError::not_found(format!("session {} not found", session_id)))?;

    if !store.user_in_session(session_id, email).await? {
        tracing::info!("[Server] {} is not a member of session {}", email, session_id);
        return Err(BackendError::forbidden("not a member of this session"));
    }
    Ok(session)
}

/// Parse a required integer query parameter
///
/// # Errors
///
/// `400 Bad Request` naming the parameter when it is missing or not an
/// integer
pub fn parse_id(name: &str, value: Option<&str>) -> BackendResult<i64> {
    let value = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| BackendError::bad_request(format!("missing {} parameter", name)))?;
    value
        .parse()
        .map_err(|_| BackendError::bad_request(format!("{} parameter must be an integer", name)))
}
