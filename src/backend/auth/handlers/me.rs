/**
 * Auth Check Handler
 *
 * GET /auth/check sits behind the auth middleware, so reaching it means the
 * access token was accepted. It echoes the authenticated email.
 */

use axum::response::Json;

use crate::backend::auth::handlers::types::AuthCheckResponse;
use crate::backend::middleware::AuthUser;

pub async fn auth_check(AuthUser(user): AuthUser) -> Json<AuthCheckResponse> {
    Json(AuthCheckResponse { email: user.email })
}
