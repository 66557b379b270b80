//! Login session tracking.
//!
//! A `user_sessions` row is opened when a user logs in and closed when they
//! log out. Its ID rides along in the cookie session so logout can find it.
//! Tracking failures are logged and never block login or logout.

use sqlx::PgPool;
use tower_sessions::Session;

use heavyshop_core::UserId;

use crate::db::SessionRepository;
use crate::models::session::TrackedSession;
use crate::models::session_keys;

/// Open a tracked session for a user who just logged in.
///
/// A visit still open in this cookie session is closed first.
pub async fn begin_tracked_session(pool: &PgPool, session: &Session, user_id: UserId) {
    end_tracked_session(pool, session).await;

    let id = match SessionRepository::new(pool).start(user_id).await {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!(error = %e, user_id = %user_id, "Failed to open tracked session");
            return;
        }
    };

    if let Err(e) = session
        .insert(session_keys::TRACKED_SESSION, TrackedSession(id))
        .await
    {
        tracing::warn!(error = %e, "Failed to store tracked session id");
    }
}

/// Close the tracked session of a user who is logging out.
pub async fn end_tracked_session(pool: &PgPool, session: &Session) {
    let tracked = match session
        .remove::<TrackedSession>(session_keys::TRACKED_SESSION)
        .await
    {
        Ok(Some(tracked)) => tracked,
        Ok(None) => return,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read tracked session id");
            return;
        }
    };

    if let Err(e) = SessionRepository::new(pool).end(tracked.0).await {
        tracing::warn!(error = %e, "Failed to close tracked session");
    }
}
