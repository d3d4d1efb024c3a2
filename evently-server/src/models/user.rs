//! User account model
//!
//! Rows in `users` bridge the identity provider's world and ours: the
//! provider's `external_id` on one side, our [`UserId`] primary key on the
//! other. Rows are written only by the identity-provider webhook.

use chrono::{DateTime, Utc};
use evently_core::identity::{ExternalUserId, UserId};
use once_cell::sync::Lazy;
use regex::Regex;

// Deliberately loose: one '@', no whitespace. Provider fallback addresses
// like 'no-email@unknown' have no dot in the domain.
static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+$").expect("email pattern compiles"));

/// A registered account.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub external_id: ExternalUserId,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Name to greet the user with; falls back to the email local part.
    pub fn display_name(&self) -> &str {
        if let Some(first) = self.first_name.as_deref() {
            if !first.is_empty() {
                return first;
            }
        }
        self.email.split('@').next().unwrap_or(&self.email)
    }
}

/// Loose shape check on addresses arriving from webhook payloads.
pub fn is_valid_email(value: &str) -> bool {
    EMAIL.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn user(first_name: Option<&str>, email: &str) -> User {
        User {
            id: UserId::new(Uuid::nil()),
            external_id: ExternalUserId::new("user_1"),
            email: email.to_string(),
            first_name: first_name.map(str::to_owned),
            last_name: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn display_name_prefers_first_name() {
        assert_eq!(user(Some("Ada"), "ada@example.com").display_name(), "Ada");
        assert_eq!(user(None, "ada@example.com").display_name(), "ada");
        assert_eq!(user(Some(""), "ada@example.com").display_name(), "ada");
    }

    #[test]
    fn email_shape() {
        assert!(is_valid_email("ada@example.com"));
        assert!(is_valid_email("no-email@unknown"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("spaces in@example.com"));
        assert!(!is_valid_email("two@@example.com"));
    }
}
