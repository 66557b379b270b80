//! Daily sales snapshot.
//!
//! Meant for a nightly cron job; re-running for the same day replaces the row.

use chrono::{NaiveDate, Utc};

use heavyshop_storefront::db::StatsRepository;

use super::{CommandError, connect};

/// Compute and store the snapshot for `date` (UTC today when omitted).
pub async fn snapshot(date: Option<NaiveDate>) -> Result<(), CommandError> {
    let date = date.unwrap_or_else(|| Utc::now().date_naive());
    let pool = connect().await?;

    let snapshot = StatsRepository::new(&pool).snapshot_for_date(date).await?;

    tracing::info!(
        date = %snapshot.date,
        total_sales = %snapshot.total_sales,
        total_orders = snapshot.total_orders,
        average_order_value = %snapshot.average_order_value,
        best_selling_book = snapshot.best_selling_book.as_deref().unwrap_or("-"),
        best_selling_genre = snapshot.best_selling_genre.as_deref().unwrap_or("-"),
        "Sales snapshot stored"
    );
    Ok(())
}
