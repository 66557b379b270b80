//! Subcommand implementations.
//!
//! # Environment Variables
//!
//! - `HEAVYSHOP_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)

pub mod migrate;
pub mod seed;
pub mod staff;
pub mod stats;
pub mod test_data;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

use heavyshop_storefront::db::{self, RepositoryError};
use heavyshop_storefront::services::AuthError;

/// Errors shared by all commands.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("No user named {0}")]
    UnknownUser(String),

    #[error("Fixture file error: {0}")]
    Fixtures(String),
}

/// Connect to the storefront database named in the environment.
pub async fn connect() -> Result<PgPool, CommandError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("HEAVYSHOP_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| CommandError::MissingEnvVar("HEAVYSHOP_DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    Ok(db::create_pool(&database_url).await?)
}
