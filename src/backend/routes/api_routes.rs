/**
 * API Route Handlers
 *
 * # Routes
 *
 * ## Public
 * - `POST /login` - Find-or-create the user and issue tokens
 * - `POST /token/refresh` - Exchange a refresh token for an access token
 *
 * ## Protected
 * - `GET /auth/check` - Echo the authenticated email
 * - `POST /session`, `GET /session/{id}`, `POST /session/{id}/shuffle`
 * - `GET|POST /user`, `GET|POST /user/submission`, `GET /user/group`
 * - `POST /group`, `POST /group/user/add`, `DELETE /group/{id}`
 * - `GET /ws/session/{id}` - Websocket upgrade
 */

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::backend::api::{
    add_user_to_group, create_group, create_user, delete_group, get_submission, get_user,
    get_user_groups, upsert_submission,
};
use crate::backend::auth::{auth_check, login, refresh_token};
use crate::backend::realtime::session_socket;
use crate::backend::server::state::AppState;
use crate::backend::session::{create_session, get_session, shuffle_session};

/// Routes reachable without an access token
pub fn configure_public_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/login", post(login))
        .route("/token/refresh", post(refresh_token))
}

/// Routes that run behind `auth_middleware`
///
/// The caller layers the middleware over the returned router; handlers
/// read the caller through the `AuthUser` extractor.
pub fn configure_protected_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/auth/check", get(auth_check))
        // Sessions
        .route("/session", post(create_session))
        .route("/session/{id}", get(get_session))
        .route("/session/{id}/shuffle", post(shuffle_session))
        // Users and submissions
        .route("/user", get(get_user).post(create_user))
        .route("/user/submission", get(get_submission).post(upsert_submission))
        .route("/user/group", get(get_user_groups))
        // Groups
        .route("/group", post(create_group))
        .route("/group/user/add", post(add_user_to_group))
        .route("/group/{id}", delete(delete_group))
        // Live session updates
        .route("/ws/session/{id}", get(session_socket))
}
