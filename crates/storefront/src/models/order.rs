//! Orders and checkout input.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use heavyshop_core::pricing::{apply_percent, order_total};
use heavyshop_core::{
    BookId, CustomerId, OrderId, OrderItemId, PickupPointId, PromoCodeId, format_price, line_total,
};

use super::PickupPoint;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub shipping_address: String,
    pub delivery_date: Option<NaiveDate>,
    pub pickup_point_id: Option<PickupPointId>,
    pub promo_code_id: Option<PromoCodeId>,
    pub discount_percent: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An order line with the price paid at checkout.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub book_id: BookId,
    pub title: String,
    pub price: Decimal,
    pub quantity: i32,
}

impl OrderItem {
    #[must_use]
    pub fn total(&self) -> Decimal {
        line_total(self.price, self.quantity)
    }

    #[must_use]
    pub fn price_display(&self) -> String {
        format_price(self.price)
    }

    #[must_use]
    pub fn total_display(&self) -> String {
        format_price(self.total())
    }
}

/// An order with its lines and totals.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub pickup_point: Option<PickupPoint>,
    pub promo_code: Option<String>,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
}

impl OrderDetail {
    #[must_use]
    pub fn new(
        order: Order,
        items: Vec<OrderItem>,
        pickup_point: Option<PickupPoint>,
        promo_code: Option<String>,
    ) -> Self {
        let totals: Vec<Decimal> = items.iter().map(OrderItem::total).collect();
        let subtotal: Decimal = totals.iter().copied().sum();
        let total = order_total(&totals, Some(order.discount_percent));
        Self {
            discount: subtotal - total,
            subtotal,
            total,
            order,
            items,
            pickup_point,
            promo_code,
        }
    }

    #[must_use]
    pub fn total_display(&self) -> String {
        format_price(self.total)
    }

    #[must_use]
    pub fn subtotal_display(&self) -> String {
        format_price(self.subtotal)
    }

    #[must_use]
    pub fn discount_display(&self) -> String {
        format_price(self.discount)
    }
}

/// One row of the order history.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderSummary {
    pub id: OrderId,
    pub created_at: DateTime<Utc>,
    pub delivery_date: Option<NaiveDate>,
    pub discount_percent: i32,
    pub item_count: i64,
    pub subtotal: Decimal,
}

impl OrderSummary {
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.subtotal - apply_percent(self.subtotal, self.discount_percent)
    }

    #[must_use]
    pub fn total_display(&self) -> String {
        format_price(self.total())
    }
}

/// Checkout details: where to ship and an optional promo code.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutRequest {
    #[serde(default)]
    pub shipping_address: String,
    #[serde(default)]
    pub delivery_date: Option<NaiveDate>,
    #[serde(default)]
    pub pickup_point_id: Option<PickupPointId>,
    #[serde(default)]
    pub promo_code: Option<String>,
}

impl CheckoutRequest {
    /// Trim fields and check the delivery date is not in the past.
    ///
    /// # Errors
    ///
    /// Returns a user-facing message for the first invalid field.
    pub fn validate(mut self, today: NaiveDate) -> Result<Self, String> {
        self.shipping_address = self.shipping_address.trim().to_owned();
        if self.shipping_address.is_empty() && self.pickup_point_id.is_none() {
            return Err("Shipping address or pickup point is required".to_owned());
        }
        if self.delivery_date.is_some_and(|d| d < today) {
            return Err("Delivery date cannot be in the past".to_owned());
        }
        self.promo_code = self
            .promo_code
            .map(|c| c.trim().to_uppercase())
            .filter(|c| !c.is_empty());
        Ok(self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn order(discount_percent: i32) -> Order {
        Order {
            id: OrderId::new(1),
            customer_id: CustomerId::new(1),
            shipping_address: "Minsk".to_owned(),
            delivery_date: None,
            pickup_point_id: None,
            promo_code_id: None,
            discount_percent,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_pickup_checkout_needs_no_address() {
        let request: CheckoutRequest = serde_json::from_str(r#"{"pickup_point_id": 2}"#).unwrap();
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let request = request.validate(today).unwrap();
        assert!(request.shipping_address.is_empty());
        assert_eq!(request.pickup_point_id, Some(PickupPointId::new(2)));

        let empty: CheckoutRequest = serde_json::from_str("{}").unwrap();
        assert!(empty.validate(today).is_err());
    }

    fn item(price: Decimal, quantity: i32) -> OrderItem {
        OrderItem {
            id: OrderItemId::new(1),
            book_id: BookId::new(1),
            title: "Dune".to_owned(),
            price,
            quantity,
        }
    }

    #[test]
    fn test_detail_total_is_sum_of_lines() {
        let detail = OrderDetail::new(
            order(0),
            vec![item(Decimal::new(1000, 2), 2), item(Decimal::new(550, 2), 1)],
            None,
            None,
        );
        assert_eq!(detail.total, Decimal::new(2550, 2));
        assert_eq!(detail.discount, Decimal::ZERO);
    }

    #[test]
    fn test_detail_applies_stored_discount() {
        let detail = OrderDetail::new(order(10), vec![item(Decimal::new(2000, 2), 1)], None, None);
        assert_eq!(detail.subtotal, Decimal::new(2000, 2));
        assert_eq!(detail.discount, Decimal::new(200, 2));
        assert_eq!(detail.total_display(), "18.00 BYN");
    }

    #[test]
    fn test_summary_total_matches_detail() {
        let summary = OrderSummary {
            id: OrderId::new(1),
            created_at: Utc::now(),
            delivery_date: None,
            discount_percent: 15,
            item_count: 1,
            subtotal: Decimal::new(3333, 2),
        };
        assert_eq!(summary.total(), Decimal::new(2833, 2));
    }

    #[test]
    fn test_checkout_validation() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let request = CheckoutRequest {
            shipping_address: "  Minsk ".to_owned(),
            promo_code: Some(" summer10 ".to_owned()),
            ..CheckoutRequest::default()
        }
        .validate(today)
        .unwrap();
        assert_eq!(request.shipping_address, "Minsk");
        assert_eq!(request.promo_code.as_deref(), Some("SUMMER10"));

        assert!(CheckoutRequest::default().validate(today).is_err());
        let past = CheckoutRequest {
            shipping_address: "Minsk".to_owned(),
            delivery_date: NaiveDate::from_ymd_opt(2026, 10, 1),
            ..CheckoutRequest::default()
        };
        assert!(past.validate(today).is_err());
    }
}
