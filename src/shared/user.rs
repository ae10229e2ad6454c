/**
 * User Types
 *
 * A user is identified by a normalized email address. Every place that
 * stores or compares an email goes through `normalize_email` first.
 */
use serde::{Deserialize, Serialize};

use crate::shared::error::SharedError;

/// Database identifier for users
pub type UserId = i64;

/// A registered user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique user ID
    pub id: UserId,
    /// Display name
    pub name: String,
    /// Normalized (lower-cased) email, unique across users
    pub email: String,
}

/// Normalize an email for storage or comparison.
///
/// Emails are trimmed and lower-cased. No further validation is done here.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Normalize an email and reject empty or obviously malformed values.
///
/// # Errors
///
/// Returns a `ValidationError` on the `email` field if the value is empty or
/// does not contain an `@`.
pub fn validated_email(email: &str) -> Result<String, SharedError> {
    let email = normalize_email(email);
    if email.is_empty() {
        return Err(SharedError::validation("email", "Email cannot be empty"));
    }
    if !email.contains('@') {
        return Err(SharedError::validation(
            "email",
            format!("'{}' is not an email address", email),
        ));
    }
    Ok(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Alice@Example.COM "), "alice@example.com");
    }

    #[test]
    fn test_validated_email_rejects_empty() {
        assert!(validated_email("   ").is_err());
        assert!(validated_email("not-an-email").is_err());
        assert_eq!(validated_email("Bob@Acme.io").unwrap(), "bob@acme.io");
    }
}
