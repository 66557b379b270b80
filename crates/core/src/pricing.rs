//! Order quotes and promo code windows.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cart::CartLine;
use crate::types::round_money;

/// Why a checkout could not be priced.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum QuoteError {
    #[error("Cart is empty")]
    EmptyCart,
    #[error("Not enough stock for {title}")]
    InsufficientStock { title: String },
    #[error("Invalid or expired promocode")]
    InvalidPromoCode,
    #[error("discount must be between 0 and 100 percent")]
    InvalidDiscount,
}

/// Priced checkout: what the customer pays for the current cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderQuote {
    pub lines: Vec<CartLine>,
    pub subtotal: Decimal,
    pub discount_percent: i32,
    pub discount: Decimal,
    pub total: Decimal,
}

impl OrderQuote {
    /// Price `lines` with an optional percentage discount.
    ///
    /// # Errors
    ///
    /// Fails on an empty cart, a line above stock, or a discount outside 0-100.
    pub fn new(lines: Vec<CartLine>, discount_percent: i32) -> Result<Self, QuoteError> {
        if lines.is_empty() {
            return Err(QuoteError::EmptyCart);
        }
        if !(0..=100).contains(&discount_percent) {
            return Err(QuoteError::InvalidDiscount);
        }
        if let Some(short) = lines.iter().find(|l| l.quantity > l.stock) {
            return Err(QuoteError::InsufficientStock {
                title: short.title.clone(),
            });
        }

        let subtotal: Decimal = lines.iter().map(CartLine::total).sum();
        let discount = apply_percent(subtotal, discount_percent);

        Ok(Self {
            lines,
            subtotal,
            discount_percent,
            discount,
            total: subtotal - discount,
        })
    }
}

/// `amount * percent / 100`, rounded to cents.
#[must_use]
pub fn apply_percent(amount: Decimal, percent: i32) -> Decimal {
    round_money(amount * Decimal::from(percent) / Decimal::ONE_HUNDRED)
}

/// Total of a stored order: sum of snapshot line totals minus the promo discount.
#[must_use]
pub fn order_total(line_totals: &[Decimal], discount_percent: Option<i32>) -> Decimal {
    let subtotal: Decimal = line_totals.iter().copied().sum();
    subtotal - apply_percent(subtotal, discount_percent.unwrap_or(0))
}

/// Activity flag and date range of a promo code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromoWindow {
    pub active: bool,
    pub valid_from: NaiveDate,
    pub valid_to: NaiveDate,
}

impl PromoWindow {
    /// Whether the code may be redeemed on `today` (both ends inclusive).
    #[must_use]
    pub fn is_valid_on(&self, today: NaiveDate) -> bool {
        self.active && self.valid_from <= today && today <= self.valid_to
    }
}

/// Split items into `(valid, archived)` by their promo window on `today`.
#[must_use]
pub fn partition_by_validity<T>(
    items: Vec<T>,
    today: NaiveDate,
    window: impl Fn(&T) -> PromoWindow,
) -> (Vec<T>, Vec<T>) {
    items
        .into_iter()
        .partition(|item| window(item).is_valid_on(today))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::BookId;

    fn line(title: &str, price: Decimal, quantity: i32, stock: i32) -> CartLine {
        CartLine {
            book_id: BookId::new(1),
            title: title.to_owned(),
            unit_price: price,
            quantity,
            stock,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_total_is_sum_of_lines() {
        let quote = OrderQuote::new(
            vec![
                line("Dune", Decimal::new(2500, 2), 2, 5),
                line("Emma", Decimal::new(1275, 2), 1, 1),
            ],
            0,
        )
        .unwrap();
        assert_eq!(quote.subtotal, Decimal::new(6275, 2));
        assert_eq!(quote.total, quote.subtotal);
        assert_eq!(quote.discount, Decimal::ZERO);
    }

    #[test]
    fn test_discount_is_rounded() {
        let quote = OrderQuote::new(vec![line("Dune", Decimal::new(3333, 2), 1, 4)], 15).unwrap();
        // 33.33 * 0.15 = 4.9995
        assert_eq!(quote.discount, Decimal::new(500, 2));
        assert_eq!(quote.total, Decimal::new(2833, 2));
    }

    #[test]
    fn test_empty_cart_is_rejected() {
        assert_eq!(OrderQuote::new(vec![], 0), Err(QuoteError::EmptyCart));
    }

    #[test]
    fn test_line_above_stock_names_the_book() {
        let err = OrderQuote::new(vec![line("Ulysses", Decimal::ONE, 3, 2)], 0).unwrap_err();
        assert_eq!(
            err,
            QuoteError::InsufficientStock {
                title: "Ulysses".to_owned()
            }
        );
    }

    #[test]
    fn test_discount_out_of_range() {
        assert_eq!(
            OrderQuote::new(vec![line("A", Decimal::ONE, 1, 1)], 101),
            Err(QuoteError::InvalidDiscount)
        );
    }

    #[test]
    fn test_order_total_applies_discount() {
        let lines = [Decimal::new(1000, 2), Decimal::new(1000, 2)];
        assert_eq!(order_total(&lines, None), Decimal::new(2000, 2));
        assert_eq!(order_total(&lines, Some(10)), Decimal::new(1800, 2));
    }

    #[test]
    fn test_promo_window_inclusive_bounds() {
        let window = PromoWindow {
            active: true,
            valid_from: date(2026, 1, 1),
            valid_to: date(2026, 1, 31),
        };
        assert!(window.is_valid_on(date(2026, 1, 1)));
        assert!(window.is_valid_on(date(2026, 1, 31)));
        assert!(!window.is_valid_on(date(2026, 2, 1)));
        assert!(
            !PromoWindow {
                active: false,
                ..window
            }
            .is_valid_on(date(2026, 1, 15))
        );
    }

    #[test]
    fn test_partition_by_validity() {
        let today = date(2026, 6, 1);
        let codes = vec![
            ("SUMMER", date(2026, 5, 1), date(2026, 8, 31)),
            ("SPRING", date(2026, 3, 1), date(2026, 5, 31)),
        ];
        let (valid, archived) = partition_by_validity(codes, today, |c| PromoWindow {
            active: true,
            valid_from: c.1,
            valid_to: c.2,
        });
        assert_eq!(valid.len(), 1);
        assert_eq!(valid[0].0, "SUMMER");
        assert_eq!(archived[0].0, "SPRING");
    }
}
