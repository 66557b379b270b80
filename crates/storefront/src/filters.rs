//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

use rust_decimal::Decimal;

use heavyshop_core::format_price;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Formats an amount with two decimals and the shop currency.
///
/// Usage in templates: `{{ book.price|money }}`
#[askama::filter_fn]
pub fn money(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(money_string(&value.to_string()))
}

/// Formats a number with one decimal, or `-` when it doesn't parse.
///
/// Usage in templates: `{{ age|one_decimal }}`
#[askama::filter_fn]
pub fn one_decimal(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(value
        .to_string()
        .parse::<f64>()
        .map_or_else(|_| "-".to_owned(), |v| format!("{v:.1}")))
}

fn money_string(raw: &str) -> String {
    raw.parse::<Decimal>()
        .map_or_else(|_| raw.to_owned(), format_price)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_string() {
        assert_eq!(money_string("12.5"), "12.50 BYN");
        assert_eq!(money_string("n/a"), "n/a");
    }
}
