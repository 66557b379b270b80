//! Role and moderation enums.

use serde::{Deserialize, Serialize};

/// Account role.
///
/// Stored as the `is_staff` flag on the `users` table; staff members can
/// moderate reviews, manage vacancies and the catalog, and read statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[default]
    Customer,
    Staff,
}

impl UserRole {
    /// Role for a stored `is_staff` flag.
    #[must_use]
    pub const fn from_staff_flag(is_staff: bool) -> Self {
        if is_staff { Self::Staff } else { Self::Customer }
    }

    #[must_use]
    pub const fn is_staff(self) -> bool {
        matches!(self, Self::Staff)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Customer => write!(f, "customer"),
            Self::Staff => write!(f, "staff"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Self::Customer),
            "staff" => Ok(Self::Staff),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

/// Decision taken by a moderator on a pending review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModerationAction {
    /// Publish the review.
    Approve,
    /// Drop the review.
    Reject,
}

impl std::fmt::Display for ModerationAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Approve => write!(f, "approve"),
            Self::Reject => write!(f, "reject"),
        }
    }
}

impl std::str::FromStr for ModerationAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "approve" => Ok(Self::Approve),
            "reject" => Ok(Self::Reject),
            other => Err(format!("invalid moderation action: {other}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_role_from_staff_flag() {
        assert_eq!(UserRole::from_staff_flag(true), UserRole::Staff);
        assert_eq!(UserRole::from_staff_flag(false), UserRole::Customer);
        assert!(UserRole::Staff.is_staff());
    }

    #[test]
    fn test_role_display_parses_back() {
        for role in [UserRole::Customer, UserRole::Staff] {
            assert_eq!(role.to_string().parse::<UserRole>().unwrap(), role);
        }
        assert!("admin".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_moderation_action_parse() {
        assert_eq!(
            "Approve".parse::<ModerationAction>().unwrap(),
            ModerationAction::Approve
        );
        assert_eq!(
            " reject ".parse::<ModerationAction>().unwrap(),
            ModerationAction::Reject
        );
        assert!("publish".parse::<ModerationAction>().is_err());
    }
}
