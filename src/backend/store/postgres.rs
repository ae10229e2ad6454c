//! PostgreSQL store
//!
//! Database operations for users, groups, sessions and submissions. Rows
//! are mapped by hand with `Row::get`. The schema lives in `migrations/`.

use async_trait::async_trait;
use chrono::NaiveDate;
use chrono_tz::Tz;
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, PgPool, Row};

use crate::backend::error::{is_unique_violation, BackendError, BackendResult};
use crate::backend::store::{GroupStore, SessionStore, SubmissionStore, UserStore};
use crate::shared::{
    Group, GroupId, NewGroup, NewSession, NewSubmission, Session, SessionCreation, SessionId,
    SubmissionView, User, UserId, UserSubmission,
};

const SESSION_COLUMNS: &str = "id, group_id, created_at, local_day, shuffle_seed";
const GROUP_COLUMNS: &str = "id, name, allowed_emails, timezone";
const SUBMISSION_COLUMNS: &str = "id, user_id, session_id, yesterday, today, blockers";

/// PostgreSQL-backed store
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn user_from_row(row: &PgRow) -> User {
    User {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
    }
}

fn group_from_row(row: &PgRow) -> Group {
    Group {
        id: row.get("id"),
        name: row.get("name"),
        allowed_emails: row.get("allowed_emails"),
        timezone: row.get("timezone"),
    }
}

fn session_from_row(row: &PgRow) -> Session {
    Session {
        id: row.get("id"),
        group_id: row.get("group_id"),
        created_at: row.get("created_at"),
        local_day: row.get("local_day"),
        shuffle_seed: row.get("shuffle_seed"),
    }
}

fn submission_from_row(row: &PgRow) -> UserSubmission {
    UserSubmission {
        id: row.get("id"),
        user_id: row.get("user_id"),
        session_id: row.get("session_id"),
        yesterday: row.get("yesterday"),
        today: row.get("today"),
        blockers: row.get("blockers"),
    }
}

/// Whether a database error is a foreign-key violation (SQLSTATE 23503)
fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some("23503"),
        _ => false,
    }
}

/// Insert the session unless one already exists for its (group, day)
///
/// # Returns
///
/// - `Some(Session)` when this call created the row
/// - `None` when the uniqueness constraint absorbed the insert
async fn insert_session(
    conn: &mut PgConnection,
    session: &NewSession,
) -> Result<Option<Session>, sqlx::Error> {
    let row = sqlx::query(&format!(
        r#"
        INSERT INTO sessions (group_id, created_at, local_day, shuffle_seed)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (group_id, local_day) DO NOTHING
        RETURNING {}
        "#,
        SESSION_COLUMNS
    ))
    .bind(session.group_id)
    .bind(session.created_at)
    .bind(session.local_day)
    .bind(session.shuffle_seed)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row.as_ref().map(session_from_row))
}

async fn preceding_session(
    conn: &mut PgConnection,
    group_id: GroupId,
    before: SessionId,
) -> Result<Option<Session>, sqlx::Error> {
    let row = sqlx::query(&format!(
        r#"
        SELECT {}
        FROM sessions
        WHERE group_id = $1 AND id < $2
        ORDER BY id DESC
        LIMIT 1
        "#,
        SESSION_COLUMNS
    ))
    .bind(group_id)
    .bind(before)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row.as_ref().map(session_from_row))
}

/// Copy every submission of `from` into `to` with today moved to yesterday
///
/// # Returns
///
/// Number of submissions created
async fn copy_submissions_forward(
    conn: &mut PgConnection,
    from: SessionId,
    to: SessionId,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO user_submissions (user_id, session_id, yesterday, today, blockers)
        SELECT user_id, $1, today, '{}', '{}'
        FROM user_submissions
        WHERE session_id = $2
        ON CONFLICT (user_id, session_id) DO NOTHING
        "#,
    )
    .bind(to)
    .bind(from)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected())
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, name: &str, email: &str) -> BackendResult<User> {
        let row = sqlx::query(
            r#"
            INSERT INTO users (name, email)
            VALUES ($1, $2)
            RETURNING id, name, email
            "#,
        )
        .bind(name)
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                BackendError::conflict(format!("user with email {} already exists", email))
            } else {
                e.into()
            }
        })?;

        Ok(user_from_row(&row))
    }

    async fn get_user_by_id(&self, id: UserId) -> BackendResult<Option<User>> {
        let row = sqlx::query("SELECT id, name, email FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(user_from_row))
    }

    async fn get_user_by_email(&self, email: &str) -> BackendResult<Option<User>> {
        let row = sqlx::query("SELECT id, name, email FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(user_from_row))
    }
}

#[async_trait]
impl GroupStore for PgStore {
    async fn create_group(&self, group: NewGroup) -> BackendResult<Group> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO groups (name, allowed_emails, timezone)
            VALUES ($1, $2, $3)
            RETURNING {}
            "#,
            GROUP_COLUMNS
        ))
        .bind(&group.name)
        .bind(&group.allowed_emails)
        .bind(&group.timezone)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                BackendError::conflict(format!("group {} already exists", group.name))
            } else {
                e.into()
            }
        })?;

        Ok(group_from_row(&row))
    }

    async fn get_group(&self, id: GroupId) -> BackendResult<Option<Group>> {
        let row = sqlx::query(&format!("SELECT {} FROM groups WHERE id = $1", GROUP_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(group_from_row))
    }

    async fn get_groups_by_email(&self, email: &str) -> BackendResult<Vec<Group>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM groups WHERE $1 = ANY(allowed_emails) ORDER BY id",
            GROUP_COLUMNS
        ))
        .bind(email)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(group_from_row).collect())
    }

    async fn group_contains_user(&self, group_id: GroupId, email: &str) -> BackendResult<bool> {
        let row = sqlx::query(
            "SELECT EXISTS (SELECT 1 FROM groups WHERE id = $1 AND $2 = ANY(allowed_emails))",
        )
        .bind(group_id)
        .bind(email)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.get(0))
    }

    async fn add_user_to_group(&self, group_id: GroupId, email: &str) -> BackendResult<Group> {
        let updated = sqlx::query(&format!(
            r#"
            UPDATE groups
            SET allowed_emails = array_append(allowed_emails, $2)
            WHERE id = $1 AND NOT ($2 = ANY(allowed_emails))
            RETURNING {}
            "#,
            GROUP_COLUMNS
        ))
        .bind(group_id)
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = updated {
            return Ok(group_from_row(&row));
        }
        self.get_group(group_id)
            .await?
            .ok_or_else(|| BackendError::not_found(format!("group {} not found", group_id)))
    }

    async fn delete_group(&self, id: GroupId) -> BackendResult<()> {
        let result = sqlx::query("DELETE FROM groups WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(BackendError::not_found(format!("group {} not found", id)));
        }
        Ok(())
    }
}

#[async_trait]
impl SessionStore for PgStore {
    async fn find_session_for_day(
        &self,
        group_id: GroupId,
        tz: Tz,
        day: NaiveDate,
    ) -> BackendResult<Option<Session>> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM sessions
            WHERE group_id = $1 AND (created_at AT TIME ZONE $2)::date = $3
            ORDER BY id
            LIMIT 1
            "#,
            SESSION_COLUMNS
        ))
        .bind(group_id)
        .bind(tz.name())
        .bind(day)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(session_from_row))
    }

    async fn create_session(&self, session: NewSession) -> BackendResult<SessionCreation> {
        let mut tx = self.pool.begin().await?;

        let inserted = insert_session(&mut tx, &session).await.map_err(|e| {
            if is_foreign_key_violation(&e) {
                BackendError::not_found(format!("group {} not found", session.group_id))
            } else {
                e.into()
            }
        })?;

        let Some(created) = inserted else {
            tx.rollback().await?;
            let row = sqlx::query(&format!(
                "SELECT {} FROM sessions WHERE group_id = $1 AND local_day = $2",
                SESSION_COLUMNS
            ))
            .bind(session.group_id)
            .bind(session.local_day)
            .fetch_optional(&self.pool)
            .await?;
            return match row {
                Some(row) => Ok(SessionCreation::Existing(session_from_row(&row))),
                None => Err(BackendError::internal(format!(
                    "session for group {} on {} vanished after conflict",
                    session.group_id, session.local_day
                ))),
            };
        };

        if let Some(previous) = preceding_session(&mut tx, created.group_id, created.id).await? {
            let copied = copy_submissions_forward(&mut tx, previous.id, created.id).await?;
            tracing::debug!(
                "[Session] Carried {} submissions from session {} to {}",
                copied,
                previous.id,
                created.id
            );
        }

        tx.commit().await?;
        Ok(SessionCreation::Created(created))
    }

    async fn find_preceding_session(
        &self,
        group_id: GroupId,
        before: SessionId,
    ) -> BackendResult<Option<Session>> {
        let mut conn = self.pool.acquire().await?;
        Ok(preceding_session(&mut conn, group_id, before).await?)
    }

    async fn get_session(&self, id: SessionId) -> BackendResult<Option<Session>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM sessions WHERE id = $1",
            SESSION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(session_from_row))
    }

    async fn sessions_for_group(&self, group_id: GroupId) -> BackendResult<Vec<Session>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM sessions WHERE group_id = $1 ORDER BY id",
            SESSION_COLUMNS
        ))
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(session_from_row).collect())
    }

    async fn update_shuffle(&self, id: SessionId, seed: i32) -> BackendResult<Session> {
        let row = sqlx::query(&format!(
            "UPDATE sessions SET shuffle_seed = $2 WHERE id = $1 RETURNING {}",
            SESSION_COLUMNS
        ))
        .bind(id)
        .bind(seed)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref()
            .map(session_from_row)
            .ok_or_else(|| BackendError::not_found(format!("session {} not found", id)))
    }

    async fn user_in_session(&self, session_id: SessionId, email: &str) -> BackendResult<bool> {
        let row = sqlx::query(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM sessions s
                JOIN groups g ON g.id = s.group_id
                WHERE s.id = $1 AND $2 = ANY(g.allowed_emails)
            )
            "#,
        )
        .bind(session_id)
        .bind(email)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.get(0))
    }
}

#[async_trait]
impl SubmissionStore for PgStore {
    async fn get_all_submissions(
        &self,
        session_id: SessionId,
    ) -> BackendResult<Vec<SubmissionView>> {
        let rows = sqlx::query(
            r#"
            SELECT us.id, us.user_id, us.session_id, us.yesterday, us.today, us.blockers, u.name
            FROM user_submissions us
            JOIN users u ON u.id = us.user_id
            WHERE us.session_id = $1
            ORDER BY us.user_id
            "#,
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| SubmissionView {
                submission: submission_from_row(row),
                name: row.get("name"),
            })
            .collect())
    }

    async fn upsert_submission(&self, submission: NewSubmission) -> BackendResult<UserSubmission> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO user_submissions (user_id, session_id, yesterday, today, blockers)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, session_id) DO UPDATE
            SET yesterday = EXCLUDED.yesterday,
                today = EXCLUDED.today,
                blockers = EXCLUDED.blockers
            RETURNING {}
            "#,
            SUBMISSION_COLUMNS
        ))
        .bind(submission.user_id)
        .bind(submission.session_id)
        .bind(&submission.yesterday)
        .bind(&submission.today)
        .bind(&submission.blockers)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                BackendError::not_found(format!(
                    "session {} or user {} not found",
                    submission.session_id, submission.user_id
                ))
            } else {
                e.into()
            }
        })?;

        Ok(submission_from_row(&row))
    }

    async fn get_submission(
        &self,
        session_id: SessionId,
        user_id: UserId,
    ) -> BackendResult<Option<UserSubmission>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM user_submissions WHERE session_id = $1 AND user_id = $2",
            SUBMISSION_COLUMNS
        ))
        .bind(session_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(submission_from_row))
    }
}
