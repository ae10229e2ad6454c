//! Shared Module
//!
//! Domain types and wire messages used across the backend: users, groups,
//! sessions, submissions and the websocket event payloads. Nothing in here
//! touches storage or the network.

/// Users and email normalization
pub mod user;

/// Groups and timezones
pub mod group;

/// Daily sessions
pub mod session;

/// Submissions and the aggregate view
pub mod submission;

/// Websocket event payloads
pub mod event;

/// Shared error types
pub mod error;

/// Application configuration
pub mod config;

/// Re-export commonly used types for convenience
pub use config::{AppConfig, AppConfigBuilder, ConfigError};
pub use error::SharedError;
pub use event::UserChange;
pub use group::{Group, GroupId, NewGroup};
pub use session::{NewSession, Session, SessionCreation, SessionId};
pub use submission::{NewSubmission, SubmissionView, UserSubmission};
pub use user::{normalize_email, User, UserId};
