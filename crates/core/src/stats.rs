//! Statistics helpers for the staff dashboard and daily snapshots.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::round_money;

/// Arithmetic mean, `None` for an empty slice.
#[must_use]
pub fn mean(values: &[Decimal]) -> Option<Decimal> {
    if values.is_empty() {
        return None;
    }
    let sum: Decimal = values.iter().copied().sum();
    Some(sum / Decimal::from(values.len()))
}

/// Median, `None` for an empty slice. Even-length input averages the middle pair.
#[must_use]
pub fn median(values: &[Decimal]) -> Option<Decimal> {
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    match sorted.len() {
        0 => None,
        n if n % 2 == 1 => sorted.get(mid).copied(),
        _ => {
            let lo = sorted.get(mid - 1)?;
            let hi = sorted.get(mid)?;
            Some((lo + hi) / Decimal::TWO)
        }
    }
}

/// Mean over `f64` samples (ages, durations).
#[must_use]
pub fn mean_f64(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let len = values.len() as f64;
    Some(values.iter().sum::<f64>() / len)
}

/// Median over `f64` samples. NaNs sort last.
#[must_use]
pub fn median_f64(values: &[f64]) -> Option<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_unstable_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    match sorted.len() {
        0 => None,
        n if n % 2 == 1 => sorted.get(mid).copied(),
        _ => Some((sorted.get(mid - 1)? + sorted.get(mid)?) / 2.0),
    }
}

/// Revenue per order, zero when there are no orders.
#[must_use]
pub fn average_order_value(revenue: Decimal, orders: i64) -> Decimal {
    if orders <= 0 {
        return Decimal::ZERO;
    }
    round_money(revenue / Decimal::from(orders))
}

/// Revenue per calendar month of one year, January first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlySeries {
    pub year: i32,
    pub totals: [Decimal; 12],
}

impl MonthlySeries {
    pub const MONTH_NAMES: [&'static str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];

    /// Build from `(month, total)` rows where month is 1-12; others are ignored.
    #[must_use]
    pub fn from_rows(year: i32, rows: impl IntoIterator<Item = (u32, Decimal)>) -> Self {
        let mut totals = [Decimal::ZERO; 12];
        for (month, total) in rows {
            let slot = usize::try_from(month)
                .ok()
                .and_then(|m| m.checked_sub(1))
                .and_then(|idx| totals.get_mut(idx));
            if let Some(slot) = slot {
                *slot += total;
            }
        }
        Self { year, totals }
    }

    /// `(label, total)` pairs for charts and tables.
    pub fn labelled(&self) -> impl Iterator<Item = (&'static str, Decimal)> + '_ {
        Self::MONTH_NAMES.iter().copied().zip(self.totals.iter().copied())
    }

    #[must_use]
    pub fn year_total(&self) -> Decimal {
        self.totals.iter().copied().sum()
    }
}

/// Inclusive date bounds for a report. A missing bound is open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    /// Parse `YYYY-MM-DD` bounds. Blank or unparsable values leave that bound open.
    #[must_use]
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Self {
        let bound = |raw: Option<&str>| {
            raw.and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok())
        };
        Self {
            start: bound(start),
            end: bound(end),
        }
    }

    /// Both bounds are set and the start comes after the end.
    #[must_use]
    pub fn is_reversed(&self) -> bool {
        matches!((self.start, self.end), (Some(start), Some(end)) if start > end)
    }

    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.is_none_or(|start| date >= start) && self.end.is_none_or(|end| date <= end)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn d(v: i64) -> Decimal {
        Decimal::from(v)
    }

    #[test]
    fn test_mean_and_median() {
        let values = [d(10), d(2), d(6)];
        assert_eq!(mean(&values), Some(d(6)));
        assert_eq!(median(&values), Some(d(6)));
        assert_eq!(median(&[d(1), d(4), d(2), d(3)]), Some(Decimal::new(25, 1)));
        assert_eq!(mean(&[]), None);
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn test_f64_helpers() {
        assert_eq!(mean_f64(&[20.0, 30.0]), Some(25.0));
        assert_eq!(median_f64(&[40.0, 20.0, 30.0]), Some(30.0));
        assert_eq!(median_f64(&[]), None);
    }

    #[test]
    fn test_average_order_value() {
        assert_eq!(average_order_value(d(100), 3), Decimal::new(3333, 2));
        assert_eq!(average_order_value(d(100), 0), Decimal::ZERO);
    }

    #[test]
    fn test_monthly_series_zero_fills() {
        let series = MonthlySeries::from_rows(2026, [(1, d(10)), (3, d(5)), (13, d(99)), (0, d(1))]);
        assert_eq!(series.totals[0], d(10));
        assert_eq!(series.totals[1], Decimal::ZERO);
        assert_eq!(series.totals[2], d(5));
        assert_eq!(series.year_total(), d(15));
        assert_eq!(series.labelled().next(), Some(("Jan", d(10))));
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_date_range_defaults_to_all_time() {
        let range = DateRange::parse(None, None);
        assert_eq!(range, DateRange::default());
        assert!(range.contains(day(1970, 1, 1)));
        assert!(range.contains(day(2099, 12, 31)));
    }

    #[test]
    fn test_date_range_ignores_unparsable_bounds() {
        let range = DateRange::parse(Some("yesterday"), Some("2026-10-19"));
        assert_eq!(range.start, None);
        assert_eq!(range.end, Some(day(2026, 10, 19)));
        assert!(range.contains(day(2001, 5, 5)));
        assert!(!range.contains(day(2026, 10, 20)));
        assert_eq!(DateRange::parse(Some("  "), None), DateRange::default());
    }

    #[test]
    fn test_date_range_bounds_are_inclusive() {
        let range = DateRange::parse(Some("2026-03-01"), Some("2026-03-31"));
        assert!(range.contains(day(2026, 3, 1)));
        assert!(range.contains(day(2026, 3, 31)));
        assert!(!range.contains(day(2026, 2, 28)));
        assert!(!range.is_reversed());
        assert!(DateRange::parse(Some("2026-05-01"), Some("2026-04-01")).is_reversed());
    }
}
