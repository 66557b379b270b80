//! Authentication service.
//!
//! Username/password accounts with Argon2id hashes.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use heavyshop_core::{Email, UserRole, Username};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::User;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidUsername`/`InvalidEmail` for malformed input,
    /// `AuthError::WeakPassword` if the password doesn't meet requirements and
    /// `AuthError::UserAlreadyExists` if the username is taken.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
        role: UserRole,
    ) -> Result<User, AuthError> {
        let username = Username::parse(username)?;
        let email = Email::parse(email)?;
        validate_password(password)?;

        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create(username.as_str(), &email, &password_hash, role.is_staff())
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, role = %role, "User registered");
        Ok(user)
    }

    /// Check a username and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the user is unknown or the
    /// password is wrong.
    pub async fn login(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let (user, password_hash) = self
            .users
            .get_password_hash(username.trim())
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        self.users.touch_last_login(user.id).await?;
        Ok(user)
    }
}

/// Validate password meets requirements: length, a letter and a digit.
///
/// # Errors
///
/// Returns `AuthError::WeakPassword` naming the first unmet rule.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    if !password.chars().any(char::is_alphabetic) {
        return Err(AuthError::WeakPassword(
            "password must contain a letter".to_owned(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(AuthError::WeakPassword(
            "password must contain a digit".to_owned(),
        ));
    }
    Ok(())
}

/// Check a registration form's password confirmation.
///
/// # Errors
///
/// Returns `AuthError::PasswordMismatch` when the two differ.
pub fn confirm_password(password: &str, confirmation: &str) -> Result<(), AuthError> {
    if password == confirmation {
        Ok(())
    } else {
        Err(AuthError::PasswordMismatch)
    }
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored PHC string.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_password_rules() {
        assert!(validate_password("short1").is_err());
        assert!(validate_password("onlyletters").is_err());
        assert!(validate_password("1234567890").is_err());
        assert!(validate_password("reader2026").is_ok());
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("reader2026").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("reader2026", &hash).is_ok());
        assert!(matches!(
            verify_password("reader2027", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_garbage_hash_is_invalid_credentials() {
        assert!(matches!(
            verify_password("reader2026", "not-a-hash"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_confirm_password() {
        assert!(confirm_password("a", "a").is_ok());
        assert!(matches!(
            confirm_password("a", "b"),
            Err(AuthError::PasswordMismatch)
        ));
    }
}
