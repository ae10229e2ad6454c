/**
 * Router Configuration
 *
 * Combines the public and protected route sets into one Axum router.
 *
 * # Layers
 *
 * 1. Protected routes get `auth_middleware`
 * 2. Public routes are merged in untouched
 * 3. Every request is traced through `TraceLayer`
 * 4. Unknown paths fall back to a JSON 404
 */

use axum::{middleware, Router};
use tower_http::trace::TraceLayer;

use crate::backend::error::BackendError;
use crate::backend::middleware::auth_middleware;
use crate::backend::routes::api_routes::{configure_protected_routes, configure_public_routes};
use crate::backend::server::state::AppState;

/// Create the Axum router with all routes configured
///
/// # Arguments
///
/// * `app_state` - Shared state; the broadcaster should already be started
///
/// # Returns
///
/// Configured Axum Router ready to serve requests
pub fn create_router(app_state: AppState) -> Router<()> {
    let protected = configure_protected_routes(Router::new()).layer(
        middleware::from_fn_with_state(app_state.clone(), auth_middleware),
    );

    let router = configure_public_routes(Router::new())
        .merge(protected)
        .fallback(|| async { BackendError::not_found("route not found") })
        .layer(TraceLayer::new_for_http());

    router.with_state(app_state)
}
