/**
 * Session Resolution
 *
 * Given a group and an instant, returns the canonical session for that
 * group's local calendar day, creating it when absent.
 *
 * # Resolution
 *
 * 1. Convert the instant to the group's local day
 * 2. Return the existing session for that day if there is one
 * 3. Otherwise ask the store to create it; the store inserts the session,
 *    finds the preceding session and carries its submissions forward as one
 *    atomic unit
 *
 * Two callers racing on the same group-day both end up with the same
 * session: the loser's insert is absorbed by the (group, day) uniqueness
 * constraint and the store hands back the winner's row.
 */

use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use rand::Rng;

use crate::backend::error::{BackendError, BackendResult};
use crate::backend::session::calendar::local_day;
use crate::backend::store::{SessionStore, Store};
use crate::shared::session::SHUFFLE_SEED_MAX;
use crate::shared::{Group, GroupId, NewSession, Session, SessionCreation, SessionId};

/// Draw a shuffle seed uniformly from `0..32767`
///
/// The seed only drives the display order of members; it is not
/// security-sensitive.
pub fn new_shuffle_seed() -> i32 {
    rand::rng().random_range(0..SHUFFLE_SEED_MAX)
}

/// Resolves the canonical daily session of a group
#[derive(Clone)]
pub struct SessionResolver {
    store: Arc<dyn Store>,
}

impl SessionResolver {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Return the session of `group_id` for the local day of `instant`
    ///
    /// # Arguments
    ///
    /// * `group_id` - Group owning the session
    /// * `tz` - The group's timezone
    /// * `instant` - The moment of resolution, normally `Utc::now()`
    ///
    /// # Returns
    ///
    /// The existing or newly created session. Store failures are returned
    /// unchanged and leave no partially created session behind, so the whole
    /// call may simply be retried.
    pub async fn resolve(
        &self,
        group_id: GroupId,
        tz: Tz,
        instant: DateTime<Utc>,
    ) -> BackendResult<Session> {
        let day = local_day(instant, tz);

        if let Some(session) = self.store.find_session_for_day(group_id, tz, day).await? {
            tracing::debug!(
                "[Session] Group {} already has session {} for {}",
                group_id,
                session.id,
                day
            );
            return Ok(session);
        }

        let creation = self
            .store
            .create_session(NewSession {
                group_id,
                created_at: instant,
                local_day: day,
                shuffle_seed: new_shuffle_seed(),
            })
            .await?;

        match &creation {
            SessionCreation::Created(session) => {
                tracing::info!(
                    "[Session] Created session {} for group {} on {}",
                    session.id,
                    group_id,
                    day
                );
            }
            SessionCreation::Existing(session) => {
                tracing::debug!(
                    "[Session] Concurrent resolution for group {} on {} settled on session {}",
                    group_id,
                    day,
                    session.id
                );
            }
        }

        Ok(creation.into_session())
    }

    /// Resolve using the group's stored timezone
    pub async fn resolve_for_group(
        &self,
        group: &Group,
        instant: DateTime<Utc>,
    ) -> BackendResult<Session> {
        let tz = group.tz()?;
        self.resolve(group.id, tz, instant).await
    }

    /// Draw and store a new shuffle seed for the session
    pub async fn regenerate_shuffle(&self, session_id: SessionId) -> BackendResult<Session> {
        let seed = new_shuffle_seed();
        let session = self.store.update_shuffle(session_id, seed).await?;
        tracing::debug!("[Session] Session {} reshuffled with seed {}", session_id, seed);
        Ok(session)
    }

    /// Look a session up, failing with `NotFound`
    pub async fn get(&self, session_id: SessionId) -> BackendResult<Session> {
        self.store
            .get_session(session_id)
            .await?
            .ok_or_else(|| BackendError::not_found(format!("session {} not found", session_id)))
    }
}
