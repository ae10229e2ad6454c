/**
 * Group Types
 *
 * A group owns a set of allowed member emails and the timezone used to
 * decide which calendar day a session belongs to.
 */
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::shared::error::SharedError;
use crate::shared::user::normalize_email;

/// Database identifier for groups
pub type GroupId = i64;

/// A team that holds one standup session per local day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Unique group ID
    pub id: GroupId,
    /// Globally unique group name
    pub name: String,
    /// Normalized member emails (order is irrelevant)
    pub allowed_emails: Vec<String>,
    /// IANA timezone identifier; empty means UTC
    #[serde(default)]
    pub timezone: String,
}

impl Group {
    /// Parse the group's timezone
    pub fn tz(&self) -> Result<Tz, SharedError> {
        parse_timezone(&self.timezone)
    }

    /// Check whether an email is one of the group's members
    pub fn contains_email(&self, email: &str) -> bool {
        let email = normalize_email(email);
        self.allowed_emails.iter().any(|allowed| *allowed == email)
    }
}

/// Group creation request after normalization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewGroup {
    pub name: String,
    pub allowed_emails: Vec<String>,
    #[serde(default)]
    pub timezone: String,
}

impl NewGroup {
    /// Build a normalized group definition.
    ///
    /// Emails are normalized and de-duplicated, the name is trimmed and the
    /// timezone is checked so that a group can never be stored with a zone
    /// the calendar resolver cannot parse.
    pub fn new(
        name: &str,
        allowed_emails: impl IntoIterator<Item = String>,
        timezone: &str,
    ) -> Result<Self, SharedError> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(SharedError::validation("name", "Group name cannot be empty"));
        }
        parse_timezone(timezone)?;

        Ok(Self {
            name,
            allowed_emails: normalize_emails(allowed_emails),
            timezone: timezone.trim().to_string(),
        })
    }

    /// Ensure an email is part of the member list
    pub fn with_member(mut self, email: &str) -> Self {
        let email = normalize_email(email);
        if !self.allowed_emails.contains(&email) {
            self.allowed_emails.push(email);
        }
        self
    }
}

/// Normalize a list of emails, dropping blanks and duplicates while keeping
/// first-seen order.
pub fn normalize_emails(emails: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for email in emails {
        let email = normalize_email(&email);
        if !email.is_empty() && !out.contains(&email) {
            out.push(email);
        }
    }
    out
}

/// Parse an IANA timezone name. Blank names resolve to UTC.
pub fn parse_timezone(name: &str) -> Result<Tz, SharedError> {
    let name = name.trim();
    if name.is_empty() {
        return Ok(Tz::UTC);
    }
    name.parse::<Tz>()
        .map_err(|_| SharedError::validation("timezone", format!("unknown timezone '{}'", name)))
}
