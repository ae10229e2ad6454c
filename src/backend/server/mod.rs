//! Server Module
//!
//! This module initializes and configures the Axum HTTP server.
//!
//! # Architecture
//!
//! - **`state`** - Application state structure and `FromRef` implementations
//! - **`config`** - Database connection, migrations and store selection
//! - **`init`** - Server initialization and app creation
//!
//! # Module Structure
//!
//! ```text
//! server/
//! ├── mod.rs          - Module exports and documentation
//! ├── state.rs        - AppState and FromRef implementations
//! ├── config.rs       - Database loading and store selection
//! └── init.rs         - Server initialization and app creation
//! ```
//!
//! # Initialization Flow
//!
//! 1. **Store Selection**: PostgreSQL when `DATABASE_URL` connects, else in-memory
//! 2. **State Creation**: Resolver, token issuer, registry, broadcaster
//! 3. **Background Task**: The broadcaster is started once
//! 4. **Router Creation**: Public and protected routes plus request tracing
//!
//! # Example
//!
//! ```rust,no_run
//! use standup::backend::server::create_app;
//! use standup::shared::AppConfig;
//!
//! # async fn example() {
//! let app = create_app(&AppConfig::default()).await;
//! # }
//! ```

/// Application state management
pub mod state;

/// Database loading and store selection
pub mod config;

/// Server initialization
pub mod init;

// Re-export commonly used types
pub use init::{build_state, create_app};
pub use state::AppState;
