/**
 * Submission Handlers
 *
 * - `GET /user/submission?session_id=&user_id=` - one submission
 * - `GET /user/submission?session_id=&all=true` - the session aggregate
 * - `POST /user/submission` - upsert the caller's submission
 *
 * Submissions are always written for the authenticated user; the body does
 * not choose whose entry is replaced.
 */

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;

use crate::backend::api::access::{parse_id, require_session_member};
use crate::backend::error::{BackendError, BackendResult};
use crate::backend::middleware::AuthUser;
use crate::backend::store::{Store, SubmissionStore, UserStore};
use crate::shared::{NewSubmission, SessionId, UserSubmission};

#[derive(Debug, Default, Deserialize)]
pub struct SubmissionQuery {
    pub session_id: Option<String>,
    pub user_id: Option<String>,
    pub all: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SubmissionRequest {
    pub session_id: SessionId,
    #[serde(default)]
    pub yesterday: Vec<String>,
    #[serde(default)]
    pub today: Vec<String>,
    #[serde(default)]
    pub blockers: Vec<String>,
}

/// Get one submission or the whole session aggregate
///
/// # Errors
///
/// * `400 Bad Request` - Missing or malformed `session_id`/`user_id`
/// * `403 Forbidden` - The caller is not a member of the session's group
/// * `404 Not Found` - No such session or submission
pub async fn get_submission(
    State(store): State<Arc<dyn Store>>,
    AuthUser(user): AuthUser,
    Query(query): Query<SubmissionQuery>,
) -> BackendResult<Response> {
    let session_id = parse_id("session_id", query.session_id.as_deref())?;
    require_session_member(store.as_ref(), session_id, &user.email).await?;

    if query.all.as_deref() == Some("true") {
        let all = store.get_all_submissions(session_id).await?;
        return Ok(Json(all).into_response());
    }

    let user_id = parse_id("user_id", query.user_id.as_deref())?;
    let submission = store
        .get_submission(session_id, user_id)
        .await?
        .ok_or_else(|| BackendError::not_found("user submission not found"))?;
    Ok(Json(submission).into_response())
}

/// Create or replace the caller's submission for a session
///
/// # Errors
///
/// * `403 Forbidden` - The caller is not a member of the session's group
/// * `404 Not Found` - No such session, or the caller has no user record
pub async fn upsert_submission(
    State(store): State<Arc<dyn Store>>,
    AuthUser(user): AuthUser,
    Json(request): Json<SubmissionRequest>,
) -> BackendResult<Json<UserSubmission>> {
    require_session_member(store.as_ref(), request.session_id, &user.email).await?;
    let author = store
        .get_user_by_email(&user.email)
        .await?
        .ok_or_else(|| BackendError::not_found("user not found"))?;

    let saved = store
        .upsert_submission(NewSubmission {
            user_id: author.id,
            session_id: request.session_id,
            yesterday: request.yesterday,
            today: request.today,
            blockers: request.blockers,
        })
        .await?;

    tracing::debug!(
        "[Server] Saved submission of user {} for session {}",
        author.id,
        request.session_id
    );
    Ok(Json(saved))
}
