//! Staff statistics API.

use std::collections::BTreeMap;

use axum::{Json, Router, extract::State, routing::get};
use chrono::Datelike;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::instrument;

use crate::db::StatsRepository;
use crate::error::{ApiResult, AppError};
use crate::middleware::RequireStaff;
use crate::models::{SalesOverview, StatisticsReport, TopBook};
use crate::routes::admin::DateRangeQuery;
use crate::routes::api::ApiQuery;
use crate::routes::today;
use crate::state::AppState;

/// Build the statistics router.
pub fn router() -> Router<AppState> {
    Router::new().route("/statistics", get(statistics))
}

#[derive(Debug, Serialize)]
pub struct SalesFigures {
    pub total_orders: i64,
    pub total_revenue: Decimal,
    pub avg_order_value: Decimal,
    pub customers_with_orders: i64,
}

/// Monthly revenue keyed by month number, `"1"` to `"12"`.
#[derive(Debug, Serialize)]
pub struct MonthlyFigures {
    pub year: i32,
    pub data: BTreeMap<u32, Decimal>,
}

#[derive(Debug, Serialize)]
pub struct StatisticsResponse {
    pub start_date: Option<chrono::NaiveDate>,
    pub end_date: Option<chrono::NaiveDate>,
    pub sales_statistics: SalesFigures,
    pub monthly_sales: MonthlyFigures,
    pub top_books: Vec<TopBook>,
    pub report: StatisticsReport,
}

impl StatisticsResponse {
    fn new(overview: SalesOverview, report: StatisticsReport) -> Self {
        let data = (1..=12).zip(overview.monthly_sales.totals).collect();
        Self {
            start_date: overview.start_date,
            end_date: overview.end_date,
            sales_statistics: SalesFigures {
                total_orders: overview.total_orders,
                total_revenue: overview.total_revenue,
                avg_order_value: overview.average_order_value,
                customers_with_orders: overview.customers_with_orders,
            },
            monthly_sales: MonthlyFigures {
                year: overview.monthly_sales.year,
                data,
            },
            top_books: overview.top_books,
            report,
        }
    }
}

/// Sales figures for `?start_date=&end_date=`, all time when unset.
///
/// The monthly series always covers the current year.
#[instrument(skip(state, staff, query), fields(user_id = %staff.id))]
pub async fn statistics(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    ApiQuery(query): ApiQuery<DateRangeQuery>,
) -> ApiResult<Json<StatisticsResponse>> {
    let today = today();
    let range = query.resolve().map_err(AppError::BadRequest)?;
    let stats = StatsRepository::new(state.pool());
    let overview = stats.overview(range, today.year()).await?;
    let report = stats.report(today, range).await?;
    Ok(Json(StatisticsResponse::new(overview, report)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::NaiveDate;
    use heavyshop_core::stats::MonthlySeries;

    use super::*;

    #[test]
    fn test_monthly_data_is_keyed_by_month_number() {
        let overview = SalesOverview {
            start_date: NaiveDate::from_ymd_opt(2026, 1, 1),
            end_date: None,
            total_orders: 2,
            total_revenue: Decimal::new(4000, 2),
            average_order_value: Decimal::new(2000, 2),
            customers_with_orders: 1,
            top_books: Vec::new(),
            monthly_sales: MonthlySeries::from_rows(2026, [(3, Decimal::new(4000, 2))]),
        };
        let response = StatisticsResponse::new(overview, StatisticsReport::default());
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["monthly_sales"]["data"]["3"], "40.00");
        assert_eq!(value["monthly_sales"]["data"]["1"], "0");
        assert_eq!(value["sales_statistics"]["avg_order_value"], "20.00");
        assert_eq!(value["start_date"], "2026-01-01");
        assert!(value["end_date"].is_null());
    }
}
