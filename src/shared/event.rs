/**
 * Real-time Session Events
 *
 * Wire messages exchanged over a session websocket.
 *
 * # Outbound
 *
 * - Every broadcast tick pushes the session's full aggregate as a JSON array
 *   of `SubmissionView` rows.
 * - A relayed change notice is pushed as `{"user_id": <id>}`.
 *
 * # Inbound
 *
 * Clients send `{"user_id": <id>}` after saving a submission so that the
 * other members refresh without waiting for the next tick. Anything else
 * is ignored.
 */
use serde::{Deserialize, Serialize};

use crate::shared::error::SharedError;
use crate::shared::submission::SubmissionView;
use crate::shared::user::UserId;

/// "This user just changed their submission"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserChange {
    pub user_id: UserId,
}

impl UserChange {
    /// Parse an inbound text frame. Returns `None` for anything that is not a
    /// change notice.
    pub fn parse(text: &str) -> Option<Self> {
        serde_json::from_str(text).ok()
    }

    /// Encode as a text frame payload
    pub fn encode(&self) -> Result<String, SharedError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Encode a session aggregate as a text frame payload
pub fn encode_submissions(submissions: &[SubmissionView]) -> Result<String, SharedError> {
    Ok(serde_json::to_string(submissions)?)
}
