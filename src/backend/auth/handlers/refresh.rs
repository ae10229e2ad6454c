/**
 * Token Refresh Handler
 *
 * POST /token/refresh exchanges the stored refresh token for a new access
 * token. The refresh token itself is not rotated.
 */

use std::sync::Arc;

use axum::{
    extract::State,
    http::header::SET_COOKIE,
    response::{AppendHeaders, IntoResponse, Json},
};

use crate::backend::auth::handlers::types::{RefreshRequest, RefreshResponse};
use crate::backend::auth::tokens::TokenIssuer;
use crate::backend::error::BackendResult;
use crate::backend::middleware::auth::access_token_cookie;

/// Refresh handler
///
/// # Errors
///
/// * `403 Forbidden` - No refresh token stored for the email, or it differs
pub async fn refresh_token(
    State(tokens): State<Arc<TokenIssuer>>,
    Json(request): Json<RefreshRequest>,
) -> BackendResult<impl IntoResponse> {
    let access_token = tokens
        .refresh(&request.email, &request.refresh_token)
        .await?;

    let cookie = access_token_cookie(&access_token, tokens.access_ttl());
    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(RefreshResponse { access_token }),
    ))
}
