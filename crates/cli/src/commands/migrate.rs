//! Database migration command.
//!
//! Schema migrations live in `crates/storefront/migrations/` and are
//! embedded in the storefront library; the session store creates its own
//! table afterwards.

use heavyshop_storefront::db;

use super::connect;

/// Apply all pending migrations.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let pool = connect().await?;

    tracing::info!("Running migrations...");
    db::migrate(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
