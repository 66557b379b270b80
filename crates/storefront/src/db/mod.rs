//! Database operations for the shop's `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `users`, `customers`, `user_sessions` - Accounts and tracked visits
//! - `books`, `authors`, `genres`, `publishers`, `book_authors`, `book_genres` - Catalog
//! - `carts`, `cart_items` - One persistent cart per user
//! - `orders`, `order_items`, `promo_codes`, `pickup_points` - Checkout
//! - `reviews`, `customer_reviews` - Moderated feedback
//! - `articles`, `terms`, `faqs`, `employees`, `vacancies`, `banners`,
//!   `partners`, `company_info`, `company_history` - Content pages
//! - `sales_statistics` - Daily snapshots
//! - `tower_sessions.session` - Session store (created by `tower-sessions-sqlx-store`)
//!
//! # Migrations
//!
//! Migrations live in `crates/storefront/migrations/`, are embedded at
//! compile time and run via:
//! ```bash
//! cargo run -p heavyshop-cli -- migrate
//! ```
//!
//! Queries are built at runtime with `sqlx::query_as` so the crate builds
//! without a live database.

pub mod books;
pub mod carts;
pub mod content;
pub mod customers;
pub mod orders;
pub mod reviews;
pub mod sessions;
pub mod stats;
pub mod taxonomy;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;
use tower_sessions_sqlx_store::PostgresStore;

pub use books::BookRepository;
pub use carts::CartRepository;
pub use content::ContentRepository;
pub use customers::CustomerRepository;
pub use orders::OrderRepository;
pub use reviews::ReviewRepository;
pub use sessions::SessionRepository;
pub use stats::{GenreRanking, StatsRepository};
pub use taxonomy::TaxonomyRepository;
pub use users::UserRepository;

/// Errors from repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate username).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// Input rejected by a business rule or a missing reference.
    #[error("{0}")]
    Validation(String),
}

impl RepositoryError {
    /// Classify a write error: unique violations become `Conflict`, foreign
    /// key and check violations become `Validation`.
    pub(crate) fn from_write(e: sqlx::Error, conflict: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return Self::Conflict(conflict.to_owned());
            }
            if db_err.is_foreign_key_violation() {
                return Self::Validation("referenced record does not exist".to_owned());
            }
            if db_err.is_check_violation() {
                return Self::Validation("value out of range".to_owned());
            }
        }
        Self::Database(e)
    }
}

/// Errors from running migrations.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("schema migration failed: {0}")]
    Schema(#[from] sqlx::migrate::MigrateError),
    #[error("session store migration failed: {0}")]
    SessionStore(#[from] sqlx::Error),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Apply the embedded schema migrations and create the session table.
///
/// # Errors
///
/// Returns `MigrationError` if either step fails.
pub async fn migrate(pool: &PgPool) -> Result<(), MigrationError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    PostgresStore::new(pool.clone()).migrate().await?;
    Ok(())
}
