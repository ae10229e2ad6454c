//! Middleware Module
//!
//! HTTP middleware for the backend server.
//!
//! - **`auth`** - Access token validation for protected routes
//!
//! # Example
//!
//! ```rust,no_run
//! use axum::{middleware, Router};
//! use standup::backend::middleware::auth_middleware;
//! use standup::backend::server::state::AppState;
//!
//! fn protect(router: Router<AppState>, state: AppState) -> Router<AppState> {
//!     router.layer(middleware::from_fn_with_state(state, auth_middleware))
//! }
//! ```

pub mod auth;

pub use auth::{
    auth_middleware, token_from_headers, AuthUser, AuthenticatedUser, ACCESS_TOKEN_COOKIE,
};
