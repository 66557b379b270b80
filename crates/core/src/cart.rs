//! Cart stock rules and totals.
//!
//! The storefront loads the current cart quantity and book stock inside a
//! transaction, asks these functions what the new quantity should be, and
//! writes the answer back.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{BookId, line_total};

/// Why a cart change was refused.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    #[error("Quantity must be positive")]
    InvalidQuantity,
    #[error("Book is out of stock")]
    OutOfStock,
    #[error("Not enough books in stock (available: {available})")]
    InsufficientStock { available: i32 },
}

/// Outcome of setting a line's quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityChange {
    /// Drop the line from the cart.
    Remove,
    /// Store this quantity.
    Set(i32),
}

/// Validate adding `requested` copies to a line that already holds `in_cart`.
///
/// Returns the line's new quantity.
///
/// # Errors
///
/// Returns [`CartError`] when the quantity is not positive or stock runs out.
pub const fn check_add(in_cart: i32, requested: i32, stock: i32) -> Result<i32, CartError> {
    if requested <= 0 {
        return Err(CartError::InvalidQuantity);
    }
    if stock <= 0 {
        return Err(CartError::OutOfStock);
    }
    let wanted = in_cart.saturating_add(requested);
    if wanted > stock {
        return Err(CartError::InsufficientStock { available: stock });
    }
    Ok(wanted)
}

/// Validate replacing a line's quantity with `requested`.
///
/// Zero or negative removes the line.
///
/// # Errors
///
/// Returns [`CartError::InsufficientStock`] when `requested` exceeds stock.
pub const fn check_update(requested: i32, stock: i32) -> Result<QuantityChange, CartError> {
    if requested <= 0 {
        return Ok(QuantityChange::Remove);
    }
    if requested > stock {
        return Err(CartError::InsufficientStock { available: stock });
    }
    Ok(QuantityChange::Set(requested))
}

/// A cart line joined with its book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub book_id: BookId,
    pub title: String,
    pub unit_price: Decimal,
    pub quantity: i32,
    pub stock: i32,
}

impl CartLine {
    #[must_use]
    pub fn total(&self) -> Decimal {
        line_total(self.unit_price, self.quantity)
    }
}

/// Summed cart contents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartTotals {
    pub total_cost: Decimal,
    pub total_items: i64,
}

impl CartTotals {
    #[must_use]
    pub fn from_lines(lines: &[CartLine]) -> Self {
        lines.iter().fold(Self::default(), |acc, line| Self {
            total_cost: acc.total_cost + line.total(),
            total_items: acc.total_items + i64::from(line.quantity),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn line(id: i32, price: Decimal, quantity: i32) -> CartLine {
        CartLine {
            book_id: BookId::new(id),
            title: format!("Book {id}"),
            unit_price: price,
            quantity,
            stock: 10,
        }
    }

    #[test]
    fn test_add_to_empty_line() {
        assert_eq!(check_add(0, 1, 5), Ok(1));
        assert_eq!(check_add(2, 3, 5), Ok(5));
    }

    #[test]
    fn test_add_out_of_stock_is_rejected() {
        assert_eq!(check_add(0, 1, 0), Err(CartError::OutOfStock));
    }

    #[test]
    fn test_add_beyond_stock_is_rejected() {
        assert_eq!(
            check_add(4, 2, 5),
            Err(CartError::InsufficientStock { available: 5 })
        );
    }

    #[test]
    fn test_add_non_positive_quantity() {
        assert_eq!(check_add(0, 0, 5), Err(CartError::InvalidQuantity));
        assert_eq!(check_add(0, -3, 5), Err(CartError::InvalidQuantity));
    }

    #[test]
    fn test_update_rules() {
        assert_eq!(check_update(0, 5), Ok(QuantityChange::Remove));
        assert_eq!(check_update(-1, 5), Ok(QuantityChange::Remove));
        assert_eq!(check_update(5, 5), Ok(QuantityChange::Set(5)));
        assert_eq!(
            check_update(6, 5),
            Err(CartError::InsufficientStock { available: 5 })
        );
    }

    #[test]
    fn test_totals_sum_price_times_quantity() {
        let lines = vec![
            line(1, Decimal::new(1050, 2), 2),
            line(2, Decimal::new(399, 2), 3),
        ];
        let totals = CartTotals::from_lines(&lines);
        assert_eq!(totals.total_cost, Decimal::new(3297, 2));
        assert_eq!(totals.total_items, 5);
    }

    #[test]
    fn test_totals_of_large_lines_do_not_overflow() {
        let lines = vec![
            line(1, Decimal::ONE, 2_000_000_000),
            line(2, Decimal::ONE, 2_000_000_000),
        ];
        let totals = CartTotals::from_lines(&lines);
        assert_eq!(totals.total_items, 4_000_000_000);
        assert_eq!(totals.total_cost, Decimal::from(4_000_000_000_i64));
    }

    #[test]
    fn test_totals_of_empty_cart() {
        assert_eq!(CartTotals::from_lines(&[]), CartTotals::default());
    }
}
