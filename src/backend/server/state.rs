/**
 * Application State Management
 *
 * This module defines the application state structure and implements
 * the necessary `FromRef` traits for Axum state extraction.
 *
 * # Architecture
 *
 * The `AppState` struct is the central state container, holding:
 * - The store (PostgreSQL or in-memory)
 * - The session resolver
 * - The token issuer and its refresh-token map
 * - The connection registry and the broadcaster that drains it
 * - The loaded configuration
 *
 * # Thread Safety
 *
 * Every field is an `Arc` or a cheap handle around one, so cloning the
 * state per request shares the same underlying objects.
 *
 * # Example
 *
 * ```rust
 * use standup::backend::server::state::AppState;
 * use axum::extract::State;
 *
 * async fn handler(State(state): State<AppState>) -> usize {
 *     state.rooms.session_count().await
 * }
 * ```
 */

use std::sync::Arc;

use axum::extract::FromRef;

use crate::backend::auth::TokenIssuer;
use crate::backend::realtime::{Broadcaster, SessionRooms};
use crate::backend::session::SessionResolver;
use crate::backend::store::Store;
use crate::shared::AppConfig;

/// Application state shared by every handler
#[derive(Clone)]
pub struct AppState {
    /// Persistence for users, groups, sessions and submissions
    pub store: Arc<dyn Store>,

    /// Canonical daily session resolution
    pub resolver: SessionResolver,

    /// Access token issuing/validation and the refresh-token map
    pub tokens: Arc<TokenIssuer>,

    /// Live connections per session
    pub rooms: SessionRooms,

    /// Background pusher over `rooms`; started by `create_app`
    pub broadcaster: Arc<Broadcaster>,

    /// Loaded configuration
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Wire every component around `store`
    ///
    /// Nothing is spawned here; call `broadcaster.start()` to begin pushing.
    pub fn new(config: AppConfig, store: Arc<dyn Store>) -> Self {
        let rooms = SessionRooms::new(config.push_timeout);
        let broadcaster = Arc::new(Broadcaster::new(
            rooms.clone(),
            store.clone(),
            config.broadcast_interval,
        ));

        Self {
            resolver: SessionResolver::new(store.clone()),
            tokens: Arc::new(TokenIssuer::from_config(&config)),
            store,
            rooms,
            broadcaster,
            config: Arc::new(config),
        }
    }
}

impl FromRef<AppState> for Arc<dyn Store> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.store.clone()
    }
}

impl FromRef<AppState> for SessionResolver {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.resolver.clone()
    }
}

impl FromRef<AppState> for Arc<TokenIssuer> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.tokens.clone()
    }
}

impl FromRef<AppState> for SessionRooms {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.rooms.clone()
    }
}

impl FromRef<AppState> for Arc<AppConfig> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.config.clone()
    }
}
