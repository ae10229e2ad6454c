/**
 * Login Handler
 *
 * This module implements POST /login.
 *
 * # Process
 *
 * 1. Normalize the email and look the user up
 * 2. Create the user when absent
 * 3. Issue an access token and a fresh refresh token
 * 4. Replace any stored refresh token for that email
 */

use std::sync::Arc;

use axum::{
    extract::State,
    http::header::SET_COOKIE,
    response::{AppendHeaders, IntoResponse, Json},
};

use crate::backend::auth::handlers::types::{LoginRequest, LoginResponse};
use crate::backend::auth::tokens::TokenIssuer;
use crate::backend::error::BackendResult;
use crate::backend::middleware::auth::access_token_cookie;
use crate::backend::store::Store;

/// Login handler
///
/// # Arguments
///
/// * `State(tokens)` - Token issuer
/// * `State(store)` - Store used to find or create the user
/// * `Json(request)` - Login request containing name and email
///
/// # Returns
///
/// JSON body with the user and both tokens; the access token is also set as
/// the `access_token` cookie.
///
/// # Errors
///
/// * `400 Bad Request` - If the email is empty or malformed
/// * `500 Internal Server Error` - If the store fails
///
/// # Example Request
///
/// ```http
/// POST /login HTTP/1.1
/// Content-Type: application/json
///
/// { "name": "Ada", "email": "ada@acme.io" }
/// ```
pub async fn login(
    State(tokens): State<Arc<TokenIssuer>>,
    State(store): State<Arc<dyn Store>>,
    Json(request): Json<LoginRequest>,
) -> BackendResult<impl IntoResponse> {
    let outcome = tokens
        .login(store.as_ref(), &request.email, &request.name)
        .await?;

    let cookie = access_token_cookie(&outcome.access_token, tokens.access_ttl());
    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(LoginResponse {
            user: outcome.user,
            access_token: outcome.access_token,
            refresh_token: outcome.refresh_token,
        }),
    ))
}
