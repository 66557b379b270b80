//! User account types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use heavyshop_core::{Email, UserId, UserRole};

/// A site account.
///
/// The password hash is never part of this type; it is read separately
/// by the login path only.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    pub is_staff: bool,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl User {
    #[must_use]
    pub const fn role(&self) -> UserRole {
        UserRole::from_staff_flag(self.is_staff)
    }

    /// Full name when known, otherwise the username.
    #[must_use]
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_owned()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn user(first: &str, last: &str) -> User {
        User {
            id: UserId::new(1),
            username: "reader".to_owned(),
            email: Email::parse("reader@heavyshop.by").unwrap(),
            first_name: first.to_owned(),
            last_name: last.to_owned(),
            is_staff: false,
            date_joined: Utc::now(),
            last_login: None,
        }
    }

    #[test]
    fn test_display_name_prefers_full_name() {
        assert_eq!(user("Anna", "Karenina").display_name(), "Anna Karenina");
        assert_eq!(user("Anna", "").display_name(), "Anna");
        assert_eq!(user(" ", "").display_name(), "reader");
    }
}
