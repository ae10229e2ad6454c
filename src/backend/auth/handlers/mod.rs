//! Authentication Handlers Module
//!
//! HTTP handlers for the authentication endpoints.
//!
//! # Module Structure
//!
//! ```text
//! handlers/
//! ├── mod.rs      - Module exports and documentation
//! ├── types.rs    - Request and response types
//! ├── login.rs    - Login/signup handler
//! ├── refresh.rs  - Access token refresh handler
//! └── me.rs       - Auth check handler
//! ```
//!
//! # Handlers
//!
//! - **`login`** - POST /login - Log in, creating the user on first login
//! - **`refresh_token`** - POST /token/refresh - New access token from a refresh token
//! - **`auth_check`** - GET /auth/check - Echo the authenticated email

/// Request and response types
pub mod types;

/// Login handler
pub mod login;

/// Refresh handler
pub mod refresh;

/// Auth check handler
pub mod me;

// Re-export commonly used types
pub use types::{AuthCheckResponse, LoginRequest, LoginResponse, RefreshRequest, RefreshResponse};

// Re-export handlers
pub use login::login;
pub use me::auth_check;
pub use refresh::refresh_token;
