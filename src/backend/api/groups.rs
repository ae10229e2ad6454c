/**
 * Group Handlers
 *
 * - `GET /user/group` - groups the caller belongs to
 * - `POST /group` - create a group; the caller becomes a member
 * - `POST /group/user/add` - add an email to a group the caller belongs to
 * - `DELETE /group/{id}` - delete a group the caller belongs to
 */

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;

use crate::backend::api::access::require_group_member;
use crate::backend::error::BackendResult;
use crate::backend::middleware::AuthUser;
use crate::backend::store::{GroupStore, Store};
use crate::shared::user::validated_email;
use crate::shared::{Group, GroupId, NewGroup};

#[derive(Debug, Deserialize)]
pub struct CreateGroupRequest {
    pub name: String,
    #[serde(default)]
    pub allowed_emails: Vec<String>,
    /// IANA timezone name; empty means UTC
    #[serde(default)]
    pub timezone: String,
}

#[derive(Debug, Deserialize)]
pub struct AddUserRequest {
    pub email: String,
    pub group_id: GroupId,
}

pub async fn get_user_groups(
    State(store): State<Arc<dyn Store>>,
    AuthUser(user): AuthUser,
) -> BackendResult<Json<Vec<Group>>> {
    Ok(Json(store.get_groups_by_email(&user.email).await?))
}

/// Create a group
///
/// Emails are normalized and deduplicated and the caller is added to the
/// allowed emails.
///
/// # Errors
///
/// * `400 Bad Request` - Empty name or unknown timezone
/// * `409 Conflict` - A group with this name exists
pub async fn create_group(
    State(store): State<Arc<dyn Store>>,
    AuthUser(user): AuthUser,
    Json(request): Json<CreateGroupRequest>,
) -> BackendResult<(StatusCode, Json<Group>)> {
    let group = NewGroup::new(&request.name, request.allowed_emails, &request.timezone)?
        .with_member(&user.email);

    let group = store.create_group(group).await?;
    tracing::info!(
        "[Server] {} created group {} ({})",
        user.email,
        group.id,
        group.name
    );
    Ok((StatusCode::CREATED, Json(group)))
}

/// Add an email to a group
///
/// # Errors
///
/// * `403 Forbidden` - The caller is not a member of the group
/// * `404 Not Found` - No such group
pub async fn add_user_to_group(
    State(store): State<Arc<dyn Store>>,
    AuthUser(user): AuthUser,
    Json(request): Json<AddUserRequest>,
) -> BackendResult<Json<Group>> {
    require_group_member(store.as_ref(), request.group_id, &user.email).await?;
    let email = validated_email(&request.email)?;

    let group = store.add_user_to_group(request.group_id, &email).await?;
    tracing::info!("[Server] {} added {} to group {}", user.email, email, group.id);
    Ok(Json(group))
}

/// Delete a group with its sessions and submissions
///
/// # Errors
///
/// * `403 Forbidden` - The caller is not a member of the group
/// * `404 Not Found` - No such group
pub async fn delete_group(
    State(store): State<Arc<dyn Store>>,
    AuthUser(user): AuthUser,
    Path(group_id): Path<GroupId>,
) -> BackendResult<StatusCode> {
    require_group_member(store.as_ref(), group_id, &user.email).await?;
    store.delete_group(group_id).await?;
    tracing::info!("[Server] {} deleted group {}", user.email, group_id);
    Ok(StatusCode::NO_CONTENT)
}
