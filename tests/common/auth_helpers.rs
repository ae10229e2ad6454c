//! Application and authentication test helpers
//!
//! Builds an `AppState` over the in-memory store and logs users in through
//! the real token issuer.

use std::sync::Arc;
use std::time::Duration;

use standup::backend::server::AppState;
use standup::backend::store::{GroupStore, MemoryStore, Store};
use standup::shared::{AppConfig, Group, NewGroup, User};

pub const TEST_SECRET: &str = "standup-test-secret";

/// A logged-in user
pub struct TestUser {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
}

/// Configuration with a fixed secret and a fast broadcast loop
pub fn test_config() -> AppConfig {
    AppConfig::builder()
        .jwt_secret(TEST_SECRET)
        .broadcast_interval(Duration::from_millis(50))
        .push_timeout(Duration::from_millis(500))
        .build()
        .expect("test config is valid")
}

/// State over a fresh in-memory store; the broadcaster is not started
pub fn test_state() -> AppState {
    AppState::new(test_config(), Arc::new(MemoryStore::new()))
}

/// Log in (creating the user) through the state's token issuer
pub async fn login(state: &AppState, email: &str) -> TestUser {
    let outcome = state
        .tokens
        .login(state.store.as_ref(), email, "")
        .await
        .expect("login succeeds");
    TestUser {
        user: outcome.user,
        access_token: outcome.access_token,
        refresh_token: outcome.refresh_token,
    }
}

/// Create a group with the given members
pub async fn create_group(store: &dyn Store, name: &str, tz: &str, members: &[&str]) -> Group {
    let emails: Vec<String> = members.iter().map(|m| m.to_string()).collect();
    let group = NewGroup::new(name, emails, tz).expect("valid group");
    GroupStore::create_group(store, group)
        .await
        .expect("group created")
}

/// Create authorization header value
pub fn auth_header(token: &str) -> String {
    format!("Bearer {}", token)
}
