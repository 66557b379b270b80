//! Sales statistics shown to staff and stored as daily snapshots.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use heavyshop_core::stats::MonthlySeries;
use heavyshop_core::{BookId, GenreId, format_price};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TopBook {
    pub book_id: BookId,
    pub title: String,
    pub quantity_sold: i64,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct GenreStat {
    pub genre_id: GenreId,
    pub name: String,
    pub quantity_sold: i64,
    pub revenue: Decimal,
}

impl GenreStat {
    #[must_use]
    pub fn revenue_display(&self) -> String {
        format_price(self.revenue)
    }
}

/// Sales figures for a date range.
#[derive(Debug, Clone, Serialize)]
pub struct SalesOverview {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub total_orders: i64,
    pub total_revenue: Decimal,
    pub average_order_value: Decimal,
    pub customers_with_orders: i64,
    pub top_books: Vec<TopBook>,
    pub monthly_sales: MonthlySeries,
}

/// Distribution figures for the statistics page.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StatisticsReport {
    pub sale_mean: Option<Decimal>,
    pub sale_median: Option<Decimal>,
    pub age_mean: Option<f64>,
    pub age_median: Option<f64>,
    pub session_median_minutes: Option<f64>,
    pub popular_genres: Vec<GenreStat>,
    pub profitable_genres: Vec<GenreStat>,
}

/// One `sales_statistics` row.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SalesSnapshot {
    pub date: NaiveDate,
    pub total_sales: Decimal,
    pub total_orders: i32,
    pub average_order_value: Decimal,
    pub best_selling_book: Option<String>,
    pub best_selling_genre: Option<String>,
}
