//! Standup - Main Library
//!
//! Backend for a recurring team standup tool. Groups of users get exactly
//! one session per local calendar day; members post yesterday/today/blockers
//! entries and every connected client sees the consolidated state pushed to
//! it over a websocket.
//!
//! # Module Structure
//!
//! - **`shared`** - Domain types and wire messages
//!   - Users, groups, sessions, submissions
//!   - Websocket event payloads
//!   - Configuration and shared error types
//!
//! - **`backend`** - Server-side code
//!   - Session resolution with carry-forward of the previous day's plans
//!   - Connection registry and the periodic broadcaster
//!   - Access/refresh token issuing and validation
//!   - Axum routes, middleware and the PostgreSQL/in-memory stores
//!
//! # Usage
//!
//! ```rust,no_run
//! use standup::backend::server::init::create_app;
//! use standup::shared::AppConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::load()?;
//! let app = create_app(&config).await;
//! let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.server_port)).await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! - The connection registry is guarded by a single `tokio::sync::Mutex`
//! - The refresh-token map is guarded by its own `tokio::sync::RwLock`
//! - Session creation relies on the store's atomic conditional insert

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
pub mod backend;
