/**
 * Server Initialization
 *
 * This module handles the initialization and setup of the Axum HTTP server,
 * including store selection, state creation, the broadcaster and route
 * configuration.
 *
 * # Initialization Process
 *
 * 1. Load the store (PostgreSQL if reachable, otherwise in-memory)
 * 2. Build `AppState`
 * 3. Start the broadcaster exactly once
 * 4. Create and configure the router
 */

use std::sync::Arc;

use axum::Router;

use crate::backend::routes::router::create_router;
use crate::backend::server::config::load_store;
use crate::backend::server::state::AppState;
use crate::backend::store::Store;
use crate::shared::AppConfig;

/// Build the application state around `store` and start its broadcaster
///
/// A second call on the same state does not start another loop.
pub fn build_state(config: AppConfig, store: Arc<dyn Store>) -> AppState {
    let state = AppState::new(config, store);
    state.broadcaster.start();
    state
}

/// Create and configure the Axum application
///
/// # Returns
///
/// Configured Axum Router ready to serve requests
///
/// # Error Handling
///
/// The function is designed to be resilient:
/// - Missing or unreachable database: the in-memory store is used
/// - Migration failures: logged but don't prevent startup
pub async fn create_app(config: &AppConfig) -> Router<()> {
    tracing::info!("[Server] Initializing standup backend");

    let store = load_store(config).await;
    let state = build_state(config.clone(), store);

    tracing::info!("[Server] Router configured; broadcaster running");
    create_router(state)
}
