/**
 * Authentication Middleware
 *
 * This module protects routes that require an authenticated user. It reads
 * the access token from the `Authorization: Bearer` header, falling back to
 * the `access_token` cookie, validates it and attaches the caller's email to
 * the request extensions.
 */

use std::time::Duration;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{
        header::{AUTHORIZATION, COOKIE},
        request::Parts,
        HeaderMap,
    },
    middleware::Next,
    response::Response,
};

use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;

/// Name of the cookie carrying the access token
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Authenticated user data extracted from the access token
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Normalized email from the token's `sub` claim
    pub email: String,
}

/// `Set-Cookie` value carrying an access token
pub fn access_token_cookie(token: &str, ttl: Duration) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        ACCESS_TOKEN_COOKIE,
        token,
        ttl.as_secs()
    )
}

/// Find the access token in the request headers
///
/// A bearer token wins over the cookie when both are present.
pub fn token_from_headers(headers: &HeaderMap) -> Option<&str> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if bearer.is_some() {
        return bearer;
    }

    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (name == ACCESS_TOKEN_COOKIE && !value.is_empty()).then_some(value)
        })
        .next()
}

/// Authentication middleware
///
/// This middleware:
/// 1. Extracts the access token from the Authorization header or cookie
/// 2. Verifies signature and expiry
/// 3. Attaches `AuthenticatedUser` to request extensions for use in handlers
///
/// Returns 401 Unauthorized if the token is missing or invalid
pub async fn auth_middleware(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, BackendError> {
    let token = token_from_headers(request.headers()).ok_or_else(|| {
        tracing::debug!("[Auth] Missing access token for {}", request.uri().path());
        BackendError::unauthorized("missing access token")
    })?;

    let claims = app_state.tokens.validate(token)?;

    request.extensions_mut().insert(AuthenticatedUser { email: claims.sub });

    Ok(next.run(request).await)
}

/// Axum extractor for authenticated user
///
/// This can be used as a parameter in handlers to automatically extract
/// the authenticated user from request extensions.
#[derive(Clone, Debug)]
pub struct AuthUser(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| {
                tracing::warn!("[Auth] AuthenticatedUser not found in request extensions");
                BackendError::unauthorized("not authenticated")
            })?;

        Ok(AuthUser(user))
    }
}
