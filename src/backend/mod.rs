//! Backend Module
//!
//! This module contains all server-side code for the standup service.
//!
//! # Architecture
//!
//! The backend is organized into focused submodules:
//!
//! - **`server`** - Server initialization, application state, database loading
//! - **`routes`** - HTTP route configuration and router assembly
//! - **`store`** - Persistence traits with PostgreSQL and in-memory implementations
//! - **`session`** - Local-day resolution, session creation and carry-forward
//! - **`api`** - User, group and submission handlers
//! - **`auth`** - Access/refresh tokens and the login/refresh handlers
//! - **`realtime`** - Connection registry, broadcaster and websocket endpoint
//! - **`middleware`** - Request authentication
//! - **`error`** - Backend-specific error types
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── server/         - Server initialization and state
//! ├── routes/         - Route configuration
//! ├── store/          - Persistence
//! ├── session/        - Daily session resolution
//! ├── api/            - CRUD handlers
//! ├── auth/           - Authentication
//! ├── realtime/       - Live connections and broadcasting
//! ├── middleware/     - Request middleware
//! └── error/          - Error types
//! ```
//!
//! # State Management
//!
//! `AppState` holds the store, the session resolver, the token issuer, the
//! connection registry and the configuration. Every field is cheap to clone
//! (`Arc` inside), so handlers extract only what they need via `FromRef`.

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Persistence traits and implementations
pub mod store;

/// Daily session resolution
pub mod session;

/// User, group and submission handlers
pub mod api;

/// Authentication and token management
pub mod auth;

/// Live connections and broadcasting
pub mod realtime;

/// Middleware for request processing
pub mod middleware;

/// Backend error types
pub mod error;

/// Re-export commonly used types
pub use error::{BackendError, BackendResult};
pub use server::create_app;
