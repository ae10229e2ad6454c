/**
 * Authentication Handler Types
 *
 * Request and response bodies for the login, refresh and auth-check
 * endpoints.
 */

use serde::{Deserialize, Serialize};

use crate::shared::User;

/// Login request
///
/// Login doubles as signup: an unknown email creates the user with `name`.
#[derive(Deserialize, Serialize, Debug)]
pub struct LoginRequest {
    #[serde(default)]
    pub name: String,
    pub email: String,
}

/// Login response
#[derive(Serialize, Deserialize, Debug)]
pub struct LoginResponse {
    pub user: User,
    /// Signed access token, also set as the `access_token` cookie
    pub access_token: String,
    /// Opaque token for `POST /token/refresh`
    pub refresh_token: String,
}

/// Refresh request
#[derive(Deserialize, Serialize, Debug)]
pub struct RefreshRequest {
    pub email: String,
    pub refresh_token: String,
}

/// Refresh response
#[derive(Serialize, Deserialize, Debug)]
pub struct RefreshResponse {
    pub access_token: String,
}

/// Identity of the caller as established by the auth middleware
#[derive(Serialize, Deserialize, Debug)]
pub struct AuthCheckResponse {
    pub email: String,
}
