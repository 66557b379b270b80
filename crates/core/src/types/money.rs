//! Money helpers.
//!
//! Prices are `NUMERIC(10,2)` in the database and [`Decimal`] everywhere
//! else. Floats never touch money.

use std::sync::OnceLock;

use rust_decimal::{Decimal, RoundingStrategy};

/// Currency used until [`set_currency`] installs the configured one.
pub const DEFAULT_CURRENCY: &str = "BYN";

static CURRENCY: OnceLock<String> = OnceLock::new();

/// Install the shop's display currency. Only the first call takes effect.
///
/// Returns `false` when a currency was already installed.
pub fn set_currency(code: &str) -> bool {
    CURRENCY.set(code.to_owned()).is_ok()
}

/// The shop's display currency.
#[must_use]
pub fn currency() -> &'static str {
    CURRENCY.get().map_or(DEFAULT_CURRENCY, String::as_str)
}

/// Round to two decimal places, halves away from zero.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Price of one order or cart line.
#[must_use]
pub fn line_total(unit_price: Decimal, quantity: i32) -> Decimal {
    round_money(unit_price * Decimal::from(quantity))
}

/// Format an amount in the shop currency, e.g. `12.50 BYN`.
#[must_use]
pub fn format_price(amount: Decimal) -> String {
    format_price_in(amount, currency())
}

/// Format an amount in the given currency.
///
/// ```
/// use rust_decimal::Decimal;
/// use heavyshop_core::format_price_in;
///
/// assert_eq!(format_price_in(Decimal::new(125, 1), "EUR"), "12.50 EUR");
/// ```
#[must_use]
pub fn format_price_in(amount: Decimal, currency: &str) -> String {
    format!("{:.2} {currency}", round_money(amount))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_money_half_away_from_zero() {
        assert_eq!(round_money(Decimal::new(12345, 3)), Decimal::new(1235, 2));
        assert_eq!(round_money(Decimal::new(-12345, 3)), Decimal::new(-1235, 2));
        assert_eq!(round_money(Decimal::new(12344, 3)), Decimal::new(1234, 2));
    }

    #[test]
    fn test_line_total() {
        assert_eq!(line_total(Decimal::new(1999, 2), 3), Decimal::new(5997, 2));
        assert_eq!(line_total(Decimal::new(1999, 2), 0), Decimal::ZERO);
    }

    #[test]
    fn test_format_price_pads_cents() {
        assert_eq!(format_price_in(Decimal::from(7), "BYN"), "7.00 BYN");
        assert_eq!(format_price_in(Decimal::new(1005, 3), "PLN"), "1.01 PLN");
    }
}
