//! Sales statistics for staff and daily snapshots.
//!
//! Revenue figures are `Σ price × quantity` over order items, before promo
//! discounts.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::instrument;

use heavyshop_core::stats::{
    DateRange, MonthlySeries, average_order_value, mean, mean_f64, median, median_f64,
};
use heavyshop_core::{BookId, GenreId, age_on};

use super::{RepositoryError, SessionRepository};
use crate::models::{GenreStat, SalesOverview, SalesSnapshot, StatisticsReport, TopBook};

const TOP_BOOKS: i64 = 10;
const TOP_GENRES: i64 = 5;

#[derive(sqlx::FromRow)]
struct RangeTotals {
    total_orders: i64,
    total_revenue: Decimal,
    customers_with_orders: i64,
}

/// Which genre ranking to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenreRanking {
    /// Most copies sold.
    Popular,
    /// Most revenue.
    Profitable,
}

impl GenreRanking {
    const fn order_by(self) -> &'static str {
        match self {
            Self::Popular => "quantity_sold DESC, revenue DESC, g.id",
            Self::Profitable => "revenue DESC, quantity_sold DESC, g.id",
        }
    }
}

pub struct StatsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StatsRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Sales figures for orders placed within the range, plus the monthly
    /// series of `year`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    #[instrument(skip(self))]
    pub async fn overview(
        &self,
        range: DateRange,
        year: i32,
    ) -> Result<SalesOverview, RepositoryError> {
        let totals = sqlx::query_as::<_, RangeTotals>(
            "SELECT COUNT(*)::BIGINT AS total_orders,
                    COALESCE(SUM(t.subtotal), 0)::NUMERIC(12, 2) AS total_revenue,
                    COUNT(DISTINCT t.customer_id)::BIGINT AS customers_with_orders
             FROM (
                 SELECT o.id, o.customer_id, SUM(oi.price * oi.quantity) AS subtotal
                 FROM orders o
                 LEFT JOIN order_items oi ON oi.order_id = o.id
                 WHERE ($1::DATE IS NULL OR o.created_at::DATE >= $1)
                   AND ($2::DATE IS NULL OR o.created_at::DATE <= $2)
                 GROUP BY o.id
             ) t",
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_one(self.pool)
        .await?;

        let top_books = sqlx::query_as::<_, TopBook>(
            "SELECT b.id AS book_id, b.title,
                    SUM(oi.quantity)::BIGINT AS quantity_sold,
                    SUM(oi.price * oi.quantity)::NUMERIC(12, 2) AS revenue
             FROM order_items oi
             JOIN orders o ON o.id = oi.order_id
             JOIN books b ON b.id = oi.book_id
             WHERE ($1::DATE IS NULL OR o.created_at::DATE >= $1)
               AND ($2::DATE IS NULL OR o.created_at::DATE <= $2)
             GROUP BY b.id, b.title
             ORDER BY quantity_sold DESC, b.id
             LIMIT $3",
        )
        .bind(range.start)
        .bind(range.end)
        .bind(TOP_BOOKS)
        .fetch_all(self.pool)
        .await?;

        Ok(SalesOverview {
            start_date: range.start,
            end_date: range.end,
            total_orders: totals.total_orders,
            average_order_value: average_order_value(totals.total_revenue, totals.total_orders),
            total_revenue: totals.total_revenue,
            customers_with_orders: totals.customers_with_orders,
            top_books,
            monthly_sales: self.monthly_sales(year).await?,
        })
    }

    /// Revenue per month of a year.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn monthly_sales(&self, year: i32) -> Result<MonthlySeries, RepositoryError> {
        let rows: Vec<(i32, Decimal)> = sqlx::query_as(
            "SELECT EXTRACT(MONTH FROM o.created_at)::INTEGER AS month,
                    SUM(oi.price * oi.quantity)::NUMERIC(12, 2) AS total
             FROM order_items oi
             JOIN orders o ON o.id = oi.order_id
             WHERE EXTRACT(YEAR FROM o.created_at)::INTEGER = $1
             GROUP BY 1",
        )
        .bind(year)
        .fetch_all(self.pool)
        .await?;

        Ok(MonthlySeries::from_rows(
            year,
            rows.into_iter()
                .filter_map(|(month, total)| u32::try_from(month).ok().map(|m| (m, total))),
        ))
    }

    /// Top genres by copies sold or by revenue.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn genres(&self, ranking: GenreRanking) -> Result<Vec<GenreStat>, RepositoryError> {
        let genres = sqlx::query_as::<_, GenreStat>(&format!(
            "SELECT g.id AS genre_id, g.name,
                    COALESCE(SUM(oi.quantity), 0)::BIGINT AS quantity_sold,
                    COALESCE(SUM(oi.price * oi.quantity), 0)::NUMERIC(12, 2) AS revenue
             FROM genres g
             JOIN book_genres bg ON bg.genre_id = g.id
             JOIN order_items oi ON oi.book_id = bg.book_id
             GROUP BY g.id, g.name
             ORDER BY {}
             LIMIT $1",
            ranking.order_by()
        ))
        .bind(TOP_GENRES)
        .fetch_all(self.pool)
        .await?;
        Ok(genres)
    }

    /// `price × quantity` of every order line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn sale_amounts(&self) -> Result<Vec<Decimal>, RepositoryError> {
        let amounts =
            sqlx::query_scalar("SELECT (price * quantity)::NUMERIC(12, 2) FROM order_items")
                .fetch_all(self.pool)
                .await?;
        Ok(amounts)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn birth_dates(&self) -> Result<Vec<NaiveDate>, RepositoryError> {
        let dates = sqlx::query_scalar("SELECT birth_date FROM customers")
            .fetch_all(self.pool)
            .await?;
        Ok(dates)
    }

    /// Sale, customer age and session-length distributions plus genre rankings.
    ///
    /// Only the session median is limited to `range`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn report(
        &self,
        today: NaiveDate,
        range: DateRange,
    ) -> Result<StatisticsReport, RepositoryError> {
        let sales = self.sale_amounts().await?;
        let ages: Vec<f64> = self
            .birth_dates()
            .await?
            .into_iter()
            .filter_map(|birth| age_on(birth, today))
            .map(f64::from)
            .collect();

        Ok(StatisticsReport {
            sale_mean: mean(&sales).map(|m| m.round_dp(2)),
            sale_median: median(&sales),
            age_mean: mean_f64(&ages),
            age_median: median_f64(&ages),
            session_median_minutes: SessionRepository::new(self.pool)
                .median_minutes(range)
                .await?,
            popular_genres: self.genres(GenreRanking::Popular).await?,
            profitable_genres: self.genres(GenreRanking::Profitable).await?,
        })
    }

    /// Compute and store the `sales_statistics` row for one day.
    ///
    /// Running it again for the same date replaces the row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    #[instrument(skip(self))]
    pub async fn snapshot_for_date(&self, date: NaiveDate) -> Result<SalesSnapshot, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let (orders, revenue): (i64, Decimal) = sqlx::query_as(
            "SELECT COUNT(DISTINCT o.id)::BIGINT,
                    COALESCE(SUM(oi.price * oi.quantity), 0)::NUMERIC(12, 2)
             FROM orders o
             LEFT JOIN order_items oi ON oi.order_id = o.id
             WHERE o.created_at::DATE = $1",
        )
        .bind(date)
        .fetch_one(&mut *tx)
        .await?;

        let best_book: Option<BookId> = sqlx::query_scalar(
            "SELECT oi.book_id
             FROM order_items oi
             JOIN orders o ON o.id = oi.order_id
             WHERE o.created_at::DATE = $1
             GROUP BY oi.book_id
             ORDER BY SUM(oi.quantity) DESC, oi.book_id
             LIMIT 1",
        )
        .bind(date)
        .fetch_optional(&mut *tx)
        .await?;

        let best_genre: Option<GenreId> = sqlx::query_scalar(
            "SELECT bg.genre_id
             FROM order_items oi
             JOIN orders o ON o.id = oi.order_id
             JOIN book_genres bg ON bg.book_id = oi.book_id
             WHERE o.created_at::DATE = $1
             GROUP BY bg.genre_id
             ORDER BY SUM(oi.quantity) DESC, bg.genre_id
             LIMIT 1",
        )
        .bind(date)
        .fetch_optional(&mut *tx)
        .await?;

        let total_orders = i32::try_from(orders)
            .map_err(|_| RepositoryError::DataCorruption(format!("order count {orders}")))?;

        sqlx::query(
            "INSERT INTO sales_statistics
                 (date, total_sales, total_orders, average_order_value,
                  best_selling_book_id, best_selling_genre_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (date) DO UPDATE SET
                 total_sales = EXCLUDED.total_sales,
                 total_orders = EXCLUDED.total_orders,
                 average_order_value = EXCLUDED.average_order_value,
                 best_selling_book_id = EXCLUDED.best_selling_book_id,
                 best_selling_genre_id = EXCLUDED.best_selling_genre_id",
        )
        .bind(date)
        .bind(revenue)
        .bind(total_orders)
        .bind(average_order_value(revenue, orders))
        .bind(best_book)
        .bind(best_genre)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.snapshots(Some(date), 1)
            .await?
            .pop()
            .ok_or(RepositoryError::NotFound)
    }

    /// Stored snapshots, newest first, optionally for a single date.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn snapshots(
        &self,
        date: Option<NaiveDate>,
        limit: i64,
    ) -> Result<Vec<SalesSnapshot>, RepositoryError> {
        let snapshots = sqlx::query_as::<_, SalesSnapshot>(
            "SELECT s.date, s.total_sales, s.total_orders, s.average_order_value,
                    b.title AS best_selling_book, g.name AS best_selling_genre
             FROM sales_statistics s
             LEFT JOIN books b ON b.id = s.best_selling_book_id
             LEFT JOIN genres g ON g.id = s.best_selling_genre_id
             WHERE $1::DATE IS NULL OR s.date = $1
             ORDER BY s.date DESC
             LIMIT $2",
        )
        .bind(date)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        Ok(snapshots)
    }
}
