//! Staff account commands.
//!
//! # Usage
//!
//! ```bash
//! # New account with staff access
//! hs-cli staff create -u manager -e manager@example.com -p manager2026
//!
//! # Existing customer account becomes staff
//! hs-cli staff promote -u alice
//! ```

use heavyshop_core::UserRole;
use heavyshop_storefront::db::{RepositoryError, UserRepository};
use heavyshop_storefront::services::AuthService;

use super::{CommandError, connect};

/// Register a staff account. Password rules match site registration.
pub async fn create(username: &str, email: &str, password: &str) -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!("Creating staff user: {username}");
    let user = AuthService::new(&pool)
        .register(username, email, password, UserRole::Staff)
        .await?;

    tracing::info!(user_id = %user.id, "Staff user created");
    Ok(())
}

/// Grant staff access to an existing account.
pub async fn promote(username: &str) -> Result<(), CommandError> {
    let pool = connect().await?;

    UserRepository::new(&pool)
        .set_staff(username, true)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => CommandError::UnknownUser(username.to_owned()),
            other => other.into(),
        })?;

    tracing::info!("{username} is now staff");
    Ok(())
}
