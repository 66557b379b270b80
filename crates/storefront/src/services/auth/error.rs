//! Authentication error types.

use thiserror::Error;

use heavyshop_core::{EmailError, UsernameError};

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("invalid username: {0}")]
    InvalidUsername(#[from] UsernameError),

    /// Wrong password or unknown user. The two are not distinguished.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("user already exists")]
    UserAlreadyExists,

    #[error("password validation failed: {0}")]
    WeakPassword(String),

    #[error("passwords do not match")]
    PasswordMismatch,

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("password hashing error")]
    PasswordHash,
}
