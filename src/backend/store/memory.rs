/**
 * In-Memory Store
 *
 * A process-local implementation of every store trait. All tables live
 * behind a single `tokio::sync::RwLock`, so `create_session` performs its
 * conditional insert and carry-forward under one write guard and is atomic
 * with respect to every other store call.
 *
 * Used when `DATABASE_URL` is not configured and by the test suite.
 */

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use chrono_tz::Tz;
use tokio::sync::RwLock;

use crate::backend::error::{BackendError, BackendResult};
use crate::backend::session::calendar::local_day;
use crate::backend::store::{GroupStore, SessionStore, SubmissionStore, UserStore};
use crate::shared::submission::SubmissionId;
use crate::shared::{
    Group, GroupId, NewGroup, NewSession, NewSubmission, Session, SessionCreation, SessionId,
    SubmissionView, User, UserId, UserSubmission,
};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<UserId, User>,
    groups: BTreeMap<GroupId, Group>,
    sessions: BTreeMap<SessionId, Session>,
    submissions: BTreeMap<(SessionId, UserId), UserSubmission>,
    next_user_id: UserId,
    next_group_id: GroupId,
    next_session_id: SessionId,
    next_submission_id: SubmissionId,
}

fn next(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

impl Tables {
    fn session_on_day(&self, group_id: GroupId, day: NaiveDate) -> Option<&Session> {
        self.sessions
            .values()
            .find(|s| s.group_id == group_id && s.local_day == day)
    }

    fn preceding_session(&self, group_id: GroupId, before: SessionId) -> Option<&Session> {
        self.sessions
            .range(..before)
            .rev()
            .map(|(_, session)| session)
            .find(|session| session.group_id == group_id)
    }

    fn insert_submission(&mut self, submission: NewSubmission) -> UserSubmission {
        let key = (submission.session_id, submission.user_id);
        let id = match self.submissions.get(&key) {
            Some(existing) => existing.id,
            None => next(&mut self.next_submission_id),
        };
        let stored = UserSubmission {
            id,
            user_id: submission.user_id,
            session_id: submission.session_id,
            yesterday: submission.yesterday,
            today: submission.today,
            blockers: submission.blockers,
        };
        self.submissions.insert(key, stored.clone());
        stored
    }
}

/// In-memory store
///
/// # Example
///
/// ```rust
/// use standup::backend::store::{MemoryStore, UserStore};
///
/// # async fn example() -> standup::backend::BackendResult<()> {
/// let store = MemoryStore::new();
/// let user = store.create_user("Ada", "ada@acme.io").await?;
/// assert_eq!(store.get_user_by_email("ada@acme.io").await?, Some(user));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, name: &str, email: &str) -> BackendResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == email) {
            return Err(BackendError::conflict(format!(
                "user with email {} already exists",
                email
            )));
        }
        let user = User {
            id: next(&mut tables.next_user_id),
            name: name.to_string(),
            email: email.to_string(),
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user_by_id(&self, id: UserId) -> BackendResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> BackendResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }
}

#[async_trait]
impl GroupStore for MemoryStore {
    async fn create_group(&self, group: NewGroup) -> BackendResult<Group> {
        let mut tables = self.tables.write().await;
        if tables.groups.values().any(|g| g.name == group.name) {
            return Err(BackendError::conflict(format!(
                "group {} already exists",
                group.name
            )));
        }
        let group = Group {
            id: next(&mut tables.next_group_id),
            name: group.name,
            allowed_emails: group.allowed_emails,
            timezone: group.timezone,
        };
        tables.groups.insert(group.id, group.clone());
        Ok(group)
    }

    async fn get_group(&self, id: GroupId) -> BackendResult<Option<Group>> {
        Ok(self.tables.read().await.groups.get(&id).cloned())
    }

    async fn get_groups_by_email(&self, email: &str) -> BackendResult<Vec<Group>> {
        let tables = self.tables.read().await;
        Ok(tables
            .groups
            .values()
            .filter(|g| g.allowed_emails.iter().any(|e| e == email))
            .cloned()
            .collect())
    }

    async fn group_contains_user(&self, group_id: GroupId, email: &str) -> BackendResult<bool> {
        let tables = self.tables.read().await;
        Ok(tables
            .groups
            .get(&group_id)
            .map(|g| g.allowed_emails.iter().any(|e| e == email))
            .unwrap_or(false))
    }

    async fn add_user_to_group(&self, group_id: GroupId, email: &str) -> BackendResult<Group> {
        let mut tables = self.tables.write().await;
        let group = tables
            .groups
            .get_mut(&group_id)
            .ok_or_else(|| BackendError::not_found(format!("group {} not found", group_id)))?;
        if !group.allowed_emails.iter().any(|e| e == email) {
            group.allowed_emails.push(email.to_string());
        }
        Ok(group.clone())
    }

    async fn delete_group(&self, id: GroupId) -> BackendResult<()> {
        let mut tables = self.tables.write().await;
        if tables.groups.remove(&id).is_none() {
            return Err(BackendError::not_found(format!("group {} not found", id)));
        }
        let removed: Vec<SessionId> = tables
            .sessions
            .values()
            .filter(|s| s.group_id == id)
            .map(|s| s.id)
            .collect();
        tables.sessions.retain(|_, s| s.group_id != id);
        tables
            .submissions
            .retain(|(session_id, _), _| !removed.contains(session_id));
        Ok(())
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn find_session_for_day(
        &self,
        group_id: GroupId,
        tz: Tz,
        day: NaiveDate,
    ) -> BackendResult<Option<Session>> {
        let tables = self.tables.read().await;
        Ok(tables
            .sessions
            .values()
            .find(|s| s.group_id == group_id && local_day(s.created_at, tz) == day)
            .cloned())
    }

    async fn create_session(&self, session: NewSession) -> BackendResult<SessionCreation> {
        let mut tables = self.tables.write().await;

        if !tables.groups.contains_key(&session.group_id) {
            return Err(BackendError::not_found(format!(
                "group {} not found",
                session.group_id
            )));
        }
        if let Some(existing) = tables.session_on_day(session.group_id, session.local_day) {
            return Ok(SessionCreation::Existing(existing.clone()));
        }

        let created = Session {
            id: next(&mut tables.next_session_id),
            group_id: session.group_id,
            created_at: session.created_at,
            local_day: session.local_day,
            shuffle_seed: session.shuffle_seed,
        };
        tables.sessions.insert(created.id, created.clone());

        let carried: Vec<NewSubmission> = match tables.preceding_session(created.group_id, created.id)
        {
            Some(previous) => {
                let previous_id = previous.id;
                tables
                    .submissions
                    .values()
                    .filter(|s| s.session_id == previous_id)
                    .map(|s| s.carried_forward(created.id))
                    .collect()
            }
            None => Vec::new(),
        };
        for submission in carried {
            tables.insert_submission(submission);
        }

        Ok(SessionCreation::Created(created))
    }

    async fn find_preceding_session(
        &self,
        group_id: GroupId,
        before: SessionId,
    ) -> BackendResult<Option<Session>> {
        let tables = self.tables.read().await;
        Ok(tables.preceding_session(group_id, before).cloned())
    }

    async fn get_session(&self, id: SessionId) -> BackendResult<Option<Session>> {
        Ok(self.tables.read().await.sessions.get(&id).cloned())
    }

    async fn sessions_for_group(&self, group_id: GroupId) -> BackendResult<Vec<Session>> {
        let tables = self.tables.read().await;
        Ok(tables
            .sessions
            .values()
            .filter(|s| s.group_id == group_id)
            .cloned()
            .collect())
    }

    async fn update_shuffle(&self, id: SessionId, seed: i32) -> BackendResult<Session> {
        let mut tables = self.tables.write().await;
        let session = tables
            .sessions
            .get_mut(&id)
            .ok_or_else(|| BackendError::not_found(format!("session {} not found", id)))?;
        session.shuffle_seed = seed;
        Ok(session.clone())
    }

    async fn user_in_session(&self, session_id: SessionId, email: &str) -> BackendResult<bool> {
        let tables = self.tables.read().await;
        Ok(tables
            .sessions
            .get(&session_id)
            .and_then(|s| tables.groups.get(&s.group_id))
            .map(|g| g.allowed_emails.iter().any(|e| e == email))
            .unwrap_or(false))
    }
}

#[async_trait]
impl SubmissionStore for MemoryStore {
    async fn get_all_submissions(
        &self,
        session_id: SessionId,
    ) -> BackendResult<Vec<SubmissionView>> {
        let tables = self.tables.read().await;
        // Keys are (session, user), so the range is already ordered by user id
        Ok(tables
            .submissions
            .range((session_id, UserId::MIN)..=(session_id, UserId::MAX))
            .filter_map(|(_, submission)| {
                tables.users.get(&submission.user_id).map(|user| SubmissionView {
                    submission: submission.clone(),
                    name: user.name.clone(),
                })
            })
            .collect())
    }

    async fn upsert_submission(&self, submission: NewSubmission) -> BackendResult<UserSubmission> {
        let mut tables = self.tables.write().await;
        if !tables.sessions.contains_key(&submission.session_id) {
            return Err(BackendError::not_found(format!(
                "session {} not found",
                submission.session_id
            )));
        }
        if !tables.users.contains_key(&submission.user_id) {
            return Err(BackendError::not_found(format!(
                "user {} not found",
                submission.user_id
            )));
        }
        Ok(tables.insert_submission(submission))
    }

    async fn get_submission(
        &self,
        session_id: SessionId,
        user_id: UserId,
    ) -> BackendResult<Option<UserSubmission>> {
        let tables = self.tables.read().await;
        Ok(tables.submissions.get(&(session_id, user_id)).cloned())
    }
}
