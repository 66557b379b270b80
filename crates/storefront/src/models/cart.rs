//! Cart display types.

use rust_decimal::Decimal;
use serde::Serialize;

use heavyshop_core::cart::{CartLine, CartTotals};
use heavyshop_core::{BookId, format_price};

#[derive(Debug, Clone, Serialize)]
pub struct CartItemView {
    pub book_id: BookId,
    pub title: String,
    pub unit_price: Decimal,
    pub quantity: i32,
    pub stock: i32,
    pub total: Decimal,
}

impl From<&CartLine> for CartItemView {
    fn from(line: &CartLine) -> Self {
        Self {
            book_id: line.book_id,
            title: line.title.clone(),
            unit_price: line.unit_price,
            quantity: line.quantity,
            stock: line.stock,
            total: line.total(),
        }
    }
}

impl CartItemView {
    #[must_use]
    pub fn unit_price_display(&self) -> String {
        format_price(self.unit_price)
    }

    #[must_use]
    pub fn total_display(&self) -> String {
        format_price(self.total)
    }
}

/// A user's cart as shown on the cart page and returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub total_cost: Decimal,
    pub total_items: i64,
}

impl CartView {
    #[must_use]
    pub fn from_lines(lines: &[CartLine]) -> Self {
        let totals = CartTotals::from_lines(lines);
        Self {
            items: lines.iter().map(CartItemView::from).collect(),
            total_cost: totals.total_cost,
            total_items: totals.total_items,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn total_display(&self) -> String {
        format_price(self.total_cost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_from_lines() {
        let lines = vec![CartLine {
            book_id: BookId::new(5),
            title: "Emma".to_owned(),
            unit_price: Decimal::new(1250, 2),
            quantity: 2,
            stock: 3,
        }];
        let view = CartView::from_lines(&lines);
        assert_eq!(view.total_items, 2);
        assert_eq!(view.total_display(), "25.00 BYN");
        assert_eq!(view.items[0].total_display(), "25.00 BYN");
        assert!(!view.is_empty());
    }
}
