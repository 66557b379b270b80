//! User repository for database operations.

use sqlx::PgPool;

use heavyshop_core::{Email, UserId};

use super::RepositoryError;
use crate::models::User;

const USER_COLUMNS: &str =
    "id, username, email, first_name, last_name, is_staff, date_joined, last_login";

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(user)
    }

    /// Get a user by login name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(self.pool)
        .await?;
        Ok(user)
    }

    /// Create a new user with a password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        username: &str,
        email: &Email,
        password_hash: &str,
        is_staff: bool,
    ) -> Result<User, RepositoryError> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (username, email, password_hash, is_staff)
             VALUES ($1, $2, $3, $4)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(is_staff)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "username already exists"))
    }

    /// Get a user and their password hash by login name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(
        &self,
        username: &str,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let Some(user) = self.get_by_username(username).await? else {
            return Ok(None);
        };

        let hash: String = sqlx::query_scalar("SELECT password_hash FROM users WHERE id = $1")
            .bind(user.id)
            .fetch_one(self.pool)
            .await?;

        Ok(Some((user, hash)))
    }

    /// Stamp a successful login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn touch_last_login(&self, id: UserId) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE users SET last_login = now() WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Update name and email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn update_profile(
        &self,
        id: UserId,
        first_name: &str,
        last_name: &str,
        email: &Email,
    ) -> Result<User, RepositoryError> {
        sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET first_name = $2, last_name = $3, email = $4
             WHERE id = $1
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(first_name.trim())
        .bind(last_name.trim())
        .bind(email)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Grant or revoke staff access.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no user has this name.
    pub async fn set_staff(&self, username: &str, is_staff: bool) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE users SET is_staff = $2 WHERE username = $1")
            .bind(username)
            .bind(is_staff)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
