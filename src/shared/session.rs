/**
 * Session Types
 *
 * A session is the canonical standup for one group on one local calendar
 * day. `local_day` is fixed when the session is created and backs the
 * (group, day) uniqueness constraint.
 */
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::group::GroupId;

/// Database identifier for sessions. Identifiers grow monotonically, so the
/// preceding session of a group is the one with the largest smaller id.
pub type SessionId = i64;

/// Exclusive upper bound of the shuffle seed range
pub const SHUFFLE_SEED_MAX: i32 = 32767;

/// A daily standup session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub group_id: GroupId,
    pub created_at: DateTime<Utc>,
    pub local_day: NaiveDate,
    /// Cosmetic seed used by clients to order presenters
    pub shuffle_seed: i32,
}

/// Values for a session that has not been inserted yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSession {
    pub group_id: GroupId,
    pub created_at: DateTime<Utc>,
    pub local_day: NaiveDate,
    pub shuffle_seed: i32,
}

/// Result of an atomic session insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCreation {
    /// This call inserted the session and carried submissions forward
    Created(Session),
    /// Another caller won the race for the same group-day
    Existing(Session),
}

impl SessionCreation {
    pub fn session(&self) -> &Session {
        match self {
            Self::Created(session) | Self::Existing(session) => session,
        }
    }

    pub fn into_session(self) -> Session {
        match self {
            Self::Created(session) | Self::Existing(session) => session,
        }
    }
}
