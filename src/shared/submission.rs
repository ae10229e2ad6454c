/**
 * Submission Types
 *
 * One user's yesterday/today/blockers entry for one session, plus the
 * aggregate row pushed to connected clients.
 */
use serde::{Deserialize, Serialize};

use crate::shared::session::SessionId;
use crate::shared::user::UserId;

/// Database identifier for submissions
pub type SubmissionId = i64;

/// A stored submission. At most one exists per (user, session).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSubmission {
    pub id: SubmissionId,
    pub user_id: UserId,
    pub session_id: SessionId,
    #[serde(default)]
    pub yesterday: Vec<String>,
    #[serde(default)]
    pub today: Vec<String>,
    #[serde(default)]
    pub blockers: Vec<String>,
}

/// Values written by an upsert
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSubmission {
    pub user_id: UserId,
    pub session_id: SessionId,
    #[serde(default)]
    pub yesterday: Vec<String>,
    #[serde(default)]
    pub today: Vec<String>,
    #[serde(default)]
    pub blockers: Vec<String>,
}

impl UserSubmission {
    /// The submission this one turns into in the next session: what the user
    /// planned for today becomes their yesterday, everything else starts empty.
    pub fn carried_forward(&self, session_id: SessionId) -> NewSubmission {
        NewSubmission {
            user_id: self.user_id,
            session_id,
            yesterday: self.today.clone(),
            today: Vec::new(),
            blockers: Vec::new(),
        }
    }
}

/// Aggregate row: a submission joined with the submitting user's name.
///
/// Serialized flat, so clients see `{id, user_id, session_id, yesterday,
/// today, blockers, name}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionView {
    #[serde(flatten)]
    pub submission: UserSubmission,
    pub name: String,
}
