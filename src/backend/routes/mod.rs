//! Route Configuration Module
//!
//! This module configures all HTTP routes for the backend server.
//!
//! # Module Structure
//!
//! ```text
//! routes/
//! ├── mod.rs          - Module exports and documentation
//! ├── router.rs       - Main router creation and layering
//! └── api_routes.rs   - Public and protected route tables
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use standup::backend::routes::create_router;
//! use standup::backend::server::build_state;
//! use standup::backend::store::MemoryStore;
//! use standup::shared::AppConfig;
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let state = build_state(AppConfig::default(), Arc::new(MemoryStore::new()));
//! let router = create_router(state);
//! # }
//! ```

/// Main router creation
pub mod router;

/// Public and protected route tables
pub mod api_routes;

pub use router::create_router;
