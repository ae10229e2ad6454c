//! Backend Error Module
//!
//! This module defines error types specific to the backend server.
//! These errors are used by stores, services and HTTP handlers and can be
//! converted to HTTP responses.
//!
//! # Module Structure
//!
//! ```text
//! error/
//! ├── mod.rs        - Module exports and documentation
//! ├── types.rs      - Error type definitions
//! └── conversion.rs - Error conversion implementations
//! ```
//!
//! Transport failures on a single websocket are not part of
//! this taxonomy; see `backend::realtime::TransportError`.

/// Error type definitions
pub mod types;

/// Error conversion implementations
pub mod conversion;

// Re-export commonly used types
pub use types::{is_unique_violation, BackendError, BackendResult};
