//! Tracked login sessions, used for the session-length statistic.

use sqlx::PgPool;

use heavyshop_core::stats::{DateRange, median_f64};
use heavyshop_core::{UserId, UserSessionId};

use super::RepositoryError;

pub struct SessionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SessionRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Open a session row at login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn start(&self, user_id: UserId) -> Result<UserSessionId, RepositoryError> {
        let id = sqlx::query_scalar("INSERT INTO user_sessions (user_id) VALUES ($1) RETURNING id")
            .bind(user_id)
            .fetch_one(self.pool)
            .await?;
        Ok(id)
    }

    /// Close a session row. Closing twice keeps the first end time.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn end(&self, id: UserSessionId) -> Result<(), RepositoryError> {
        sqlx::query(
            "UPDATE user_sessions
             SET ended_at = now(),
                 duration_seconds = GREATEST(EXTRACT(EPOCH FROM now() - started_at), 0)::BIGINT
             WHERE id = $1 AND ended_at IS NULL",
        )
        .bind(id)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Durations in seconds of closed sessions started within the range.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn durations(&self, range: DateRange) -> Result<Vec<i64>, RepositoryError> {
        let durations = sqlx::query_scalar(
            "SELECT duration_seconds FROM user_sessions
             WHERE duration_seconds IS NOT NULL
               AND ($1::DATE IS NULL OR started_at::DATE >= $1)
               AND ($2::DATE IS NULL OR started_at::DATE <= $2)",
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_all(self.pool)
        .await?;
        Ok(durations)
    }

    /// Median length in minutes of closed sessions started within the range.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn median_minutes(&self, range: DateRange) -> Result<Option<f64>, RepositoryError> {
        Ok(median_minutes(&self.durations(range).await?))
    }
}

#[allow(clippy::cast_precision_loss)]
fn median_minutes(seconds: &[i64]) -> Option<f64> {
    let minutes: Vec<f64> = seconds.iter().map(|s| *s as f64 / 60.0).collect();
    median_f64(&minutes)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_median_minutes() {
        assert_eq!(median_minutes(&[]), None);
        assert!((median_minutes(&[60, 600, 180]).unwrap() - 3.0).abs() < f64::EPSILON);
        assert!((median_minutes(&[60, 120]).unwrap() - 1.5).abs() < f64::EPSILON);
    }
}
