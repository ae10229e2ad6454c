/**
 * Access and Refresh Tokens
 *
 * Access tokens are HS256-signed JWTs carrying the subject email, issue
 * time and expiry. Refresh tokens are opaque 32-character alphanumeric
 * strings kept in a process-wide map of normalized email to the one valid
 * refresh token for that user.
 *
 * # Lifecycle
 *
 * - `login` issues both tokens and overwrites any stored refresh token, so
 *   a second login invalidates the first refresh token
 * - `refresh` checks the presented refresh token and issues a new access
 *   token; the refresh token itself is left unchanged
 * - refresh tokens never expire and are lost when the process restarts
 *
 * # Thread Safety
 *
 * The refresh map sits behind its own `tokio::sync::RwLock`, independent of
 * every other lock in the process.
 */

use std::collections::HashMap;
use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::distr::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::backend::auth::users::find_or_create_user;
use crate::backend::error::{BackendError, BackendResult};
use crate::backend::store::UserStore;
use crate::shared::{normalize_email, AppConfig, User};

/// Length of an issued refresh token
pub const REFRESH_TOKEN_LEN: usize = 32;

/// JWT claims structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Normalized email of the authenticated user
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
    /// Issued at time (Unix timestamp)
    pub iat: u64,
}

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
}

/// Generate a fresh opaque refresh token
pub fn generate_refresh_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(REFRESH_TOKEN_LEN)
        .map(char::from)
        .collect()
}

fn now_secs() -> u64 {
    Utc::now().timestamp().max(0) as u64
}

/// Issues and validates access tokens; owns the refresh-token map
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
    refresh_tokens: RwLock<HashMap<String, String>>,
}

impl TokenIssuer {
    /// Create an issuer signing with `secret`
    ///
    /// # Arguments
    ///
    /// * `secret` - HMAC secret shared by issuing and validation
    /// * `access_ttl` - Lifetime of issued access tokens
    pub fn new(secret: &str, access_ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            access_ttl,
            refresh_tokens: RwLock::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(&config.jwt_secret, config.access_token_ttl)
    }

    /// Lifetime of issued access tokens
    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    /// Sign an access token for `email`
    ///
    /// # Returns
    ///
    /// JWT token string valid for the configured lifetime
    pub fn issue_access_token(&self, email: &str) -> BackendResult<String> {
        let iat = now_secs();
        self.encode_claims(&Claims {
            sub: normalize_email(email),
            exp: iat.saturating_add(self.access_ttl.as_secs()),
            iat,
        })
    }

    fn encode_claims(&self, claims: &Claims) -> BackendResult<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key).map_err(|e| {
            BackendError::internal(format!("failed to sign access token: {}", e))
        })
    }

    /// Verify signature and expiry of an access token
    ///
    /// # Errors
    ///
    /// `Unauthorized` for a malformed, tampered or expired token
    pub fn validate(&self, token: &str) -> BackendResult<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("[Auth] Access token rejected: {}", e);
                BackendError::unauthorized("invalid or expired access token")
            })
    }

    /// Log a user in, creating the account on first login
    ///
    /// Issues a new access token and a new refresh token. The new refresh
    /// token replaces any previously stored one for the same email.
    pub async fn login<U>(&self, users: &U, email: &str, name: &str) -> BackendResult<LoginOutcome>
    where
        U: UserStore + ?Sized,
    {
        let user = find_or_create_user(users, email, name).await?;
        let access_token = self.issue_access_token(&user.email)?;
        let refresh_token = generate_refresh_token();

        self.refresh_tokens
            .write()
            .await
            .insert(user.email.clone(), refresh_token.clone());

        tracing::info!("[Auth] User {} logged in", user.email);
        Ok(LoginOutcome {
            user,
            access_token,
            refresh_token,
        })
    }

    /// Exchange a refresh token for a new access token
    ///
    /// # Errors
    ///
    /// `Forbidden` unless a refresh token is stored for the email and it
    /// equals `presented` exactly
    pub async fn refresh(&self, email: &str, presented: &str) -> BackendResult<String> {
        let email = normalize_email(email);
        let matches = self
            .refresh_tokens
            .read()
            .await
            .get(&email)
            .is_some_and(|stored| stored == presented);

        if !matches {
            tracing::info!("[Auth] Refresh rejected for {}", email);
            return Err(BackendError::forbidden("refresh token mismatch"));
        }
        self.issue_access_token(&email)
    }

    /// Number of users currently holding a refresh token
    pub async fn refresh_token_count(&self) -> usize {
        self.refresh_tokens.read().await.len()
    }
}
