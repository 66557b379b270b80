//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use heavyshop_core::{UserId, UserRole, UserSessionId};

use super::User;

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// Login name, shown in the header.
    pub username: String,
    /// Whether the user can reach the staff pages.
    pub is_staff: bool,
}

impl CurrentUser {
    #[must_use]
    pub const fn role(&self) -> UserRole {
        UserRole::from_staff_flag(self.is_staff)
    }
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            is_staff: user.is_staff,
        }
    }
}

/// Row id of the tracked visit opened at login.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TrackedSession(pub UserSessionId);

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the `user_sessions` row opened at login.
    pub const TRACKED_SESSION: &str = "tracked_session";
}
