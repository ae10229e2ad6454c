//! Store Module
//!
//! Persistence traits used by the resolver, the broadcaster and the HTTP
//! handlers, with two implementations:
//!
//! - **`postgres`** - `PgStore`, backed by a sqlx `PgPool`
//! - **`memory`** - `MemoryStore`, a process-local store used when no
//!   database is configured and throughout the test suite
//!
//! # Module Structure
//!
//! ```text
//! store/
//! ├── mod.rs      - Store traits
//! ├── memory.rs   - In-memory implementation
//! └── postgres.rs - PostgreSQL implementation
//! ```
//!
//! Emails passed to any store method are expected to be normalized already
//! (see `shared::normalize_email`).

use async_trait::async_trait;
use chrono::NaiveDate;
use chrono_tz::Tz;

use crate::backend::error::BackendResult;
use crate::shared::{
    Group, GroupId, NewGroup, NewSession, NewSubmission, Session, SessionCreation, SessionId,
    SubmissionView, User, UserId, UserSubmission,
};

/// In-memory implementation
pub mod memory;

/// PostgreSQL implementation
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// User persistence
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user; `Conflict` when the email is taken
    async fn create_user(&self, name: &str, email: &str) -> BackendResult<User>;

    async fn get_user_by_id(&self, id: UserId) -> BackendResult<Option<User>>;

    async fn get_user_by_email(&self, email: &str) -> BackendResult<Option<User>>;
}

/// Group persistence
#[async_trait]
pub trait GroupStore: Send + Sync {
    /// Insert a group; `Conflict` when the name is taken
    async fn create_group(&self, group: NewGroup) -> BackendResult<Group>;

    async fn get_group(&self, id: GroupId) -> BackendResult<Option<Group>>;

    /// Groups whose allowed emails contain `email`, ordered by id
    async fn get_groups_by_email(&self, email: &str) -> BackendResult<Vec<Group>>;

    async fn group_contains_user(&self, group_id: GroupId, email: &str) -> BackendResult<bool>;

    /// Add `email` to the group's allowed emails; a no-op when already present
    async fn add_user_to_group(&self, group_id: GroupId, email: &str) -> BackendResult<Group>;

    /// Delete a group together with its sessions and their submissions
    async fn delete_group(&self, id: GroupId) -> BackendResult<()>;
}

/// Session persistence
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// The session of `group_id` whose creation instant falls on `day` in `tz`
    async fn find_session_for_day(
        &self,
        group_id: GroupId,
        tz: Tz,
        day: NaiveDate,
    ) -> BackendResult<Option<Session>>;

    /// Atomically create a session and carry the preceding session's
    /// submissions forward.
    ///
    /// The insert is conditional on the (group, local day) uniqueness
    /// constraint. When another caller already created the session for that
    /// day, nothing is written and `SessionCreation::Existing` carries the
    /// winner's session. Any failure leaves no trace of the new session.
    async fn create_session(&self, session: NewSession) -> BackendResult<SessionCreation>;

    /// The session of `group_id` with the largest id strictly below `before`
    async fn find_preceding_session(
        &self,
        group_id: GroupId,
        before: SessionId,
    ) -> BackendResult<Option<Session>>;

    async fn get_session(&self, id: SessionId) -> BackendResult<Option<Session>>;

    /// All sessions of a group, oldest first
    async fn sessions_for_group(&self, group_id: GroupId) -> BackendResult<Vec<Session>>;

    /// Store a new shuffle seed; `NotFound` when the session is absent
    async fn update_shuffle(&self, id: SessionId, seed: i32) -> BackendResult<Session>;

    /// Whether `email` belongs to the group owning the session
    async fn user_in_session(&self, session_id: SessionId, email: &str) -> BackendResult<bool>;
}

/// Submission persistence
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Every submission of the session joined with the author's name,
    /// ordered by user id
    async fn get_all_submissions(&self, session_id: SessionId)
        -> BackendResult<Vec<SubmissionView>>;

    /// Insert or replace the (user, session) submission
    async fn upsert_submission(&self, submission: NewSubmission) -> BackendResult<UserSubmission>;

    async fn get_submission(
        &self,
        session_id: SessionId,
        user_id: UserId,
    ) -> BackendResult<Option<UserSubmission>>;
}

/// Everything the application needs from persistence
pub trait Store: UserStore + GroupStore + SessionStore + SubmissionStore {}

impl<T> Store for T where T: UserStore + GroupStore + SessionStore + SubmissionStore {}
