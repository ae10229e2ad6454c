/**
 * Session Handlers
 *
 * - `POST /session` - resolve today's session of a group
 * - `GET /session/{id}` - fetch a session
 * - `POST /session/{id}/shuffle` - draw a new shuffle seed
 */

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::backend::api::access::{require_group_member, require_session_member};
use crate::backend::error::BackendResult;
use crate::backend::middleware::AuthUser;
use crate::backend::server::state::AppState;
use crate::shared::{GroupId, Session, SessionId};

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    #[serde(rename = "groupId")]
    pub group_id: GroupId,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateSessionResponse {
    pub id: SessionId,
}

/// Resolve the current session of a group, creating it on first use
///
/// Responds `201 Created` with the session id whether the session was
/// created by this call or already existed for the group's local day.
///
/// # Errors
///
/// * `403 Forbidden` - The caller is not a member of the group
/// * `404 Not Found` - No such group
pub async fn create_session(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(request): Json<CreateSessionRequest>,
) -> BackendResult<(StatusCode, Json<CreateSessionResponse>)> {
    let group = require_group_member(state.store.as_ref(), request.group_id, &user.email).await?;
    let session = state.resolver.resolve_for_group(&group, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(CreateSessionResponse { id: session.id })))
}

pub async fn get_session(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(session_id): Path<SessionId>,
) -> BackendResult<Json<Session>> {
    let session = require_session_member(state.store.as_ref(), session_id, &user.email).await?;
    Ok(Json(session))
}

/// Regenerate the member display order of a session
pub async fn shuffle_session(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(session_id): Path<SessionId>,
) -> BackendResult<Json<Session>> {
    require_session_member(state.store.as_ref(), session_id, &user.email).await?;
    let session = state.resolver.regenerate_shuffle(session_id).await?;
    tracing::info!("[Session] {} reshuffled session {}", user.email, session_id);
    Ok(Json(session))
}
