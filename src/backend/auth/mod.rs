//! Authentication Module
//!
//! This module issues and validates credentials and serves the
//! authentication endpoints.
//!
//! # Module Structure
//!
//! ```text
//! auth/
//! ├── mod.rs          - Module exports and documentation
//! ├── users.rs        - Find-or-create on login
//! ├── tokens.rs       - Access JWTs and the refresh-token map
//! └── handlers/       - HTTP handlers
//! ```
//!
//! # Authentication Flow
//!
//! 1. **Login**: `{name, email}` → user found or created → access + refresh token
//! 2. **Refresh**: `{email, refresh_token}` → new access token, or 403
//! 3. **Requests**: `Authorization: Bearer <jwt>` or the `access_token`
//!    cookie, checked by `middleware::auth`
//!
//! # Security
//!
//! - There are no passwords; anyone who can submit an email can log in
//! - Access tokens expire after one hour by default
//! - Refresh tokens never expire and live only in process memory

/// Find-or-create on login
pub mod users;

/// JWT and refresh token management
pub mod tokens;

/// HTTP handlers for authentication endpoints
pub mod handlers;

// Re-export commonly used types and handlers
pub use handlers::{auth_check, login, refresh_token};
pub use tokens::{Claims, LoginOutcome, TokenIssuer};
