//! Order placement and history.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::instrument;

use heavyshop_core::catalog::{Page, PageRequest};
use heavyshop_core::pricing::{OrderQuote, QuoteError};
use heavyshop_core::{BookId, CustomerId, OrderId, UserId};

use super::RepositoryError;
use super::carts::lock_lines;
use crate::models::{CheckoutRequest, Order, OrderDetail, OrderItem, OrderSummary, PickupPoint, PromoCode};

const ORDER_COLUMNS: &str = "id, customer_id, shipping_address, delivery_date, pickup_point_id, \
     promo_code_id, discount_percent, created_at, updated_at";

pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Turn the user's cart into an order.
    ///
    /// Runs in one transaction: lock cart lines and their books, check the
    /// promo code and pickup point, price the cart, write the order with
    /// snapshot prices, take the stock and empty the cart. `request` must
    /// already be validated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` for an empty cart, short stock,
    /// an invalid promo code or an inactive pickup point.
    #[instrument(skip(self, request), fields(user_id = %user_id, customer_id = %customer_id))]
    pub async fn place(
        &self,
        user_id: UserId,
        customer_id: CustomerId,
        request: &CheckoutRequest,
        today: NaiveDate,
    ) -> Result<OrderDetail, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let lines = lock_lines(&mut tx, user_id).await?;

        let promo = match request.promo_code.as_deref() {
            Some(code) => {
                let promo = sqlx::query_as::<_, PromoCode>(
                    "SELECT id, code, discount_percent, active, valid_from, valid_to
                     FROM promo_codes WHERE UPPER(code) = $1",
                )
                .bind(code.to_uppercase())
                .fetch_optional(&mut *tx)
                .await?
                .filter(|p| p.window().is_valid_on(today))
                .ok_or_else(|| {
                    RepositoryError::Validation(QuoteError::InvalidPromoCode.to_string())
                })?;
                Some(promo)
            }
            None => None,
        };

        let quote = OrderQuote::new(lines, promo.as_ref().map_or(0, |p| p.discount_percent))
            .map_err(|e| RepositoryError::Validation(e.to_string()))?;

        let pickup = match request.pickup_point_id {
            Some(id) => Some(
                sqlx::query_as::<_, PickupPoint>(
                    "SELECT id, name, address FROM pickup_points WHERE id = $1 AND is_active",
                )
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| {
                    RepositoryError::Validation("Pickup point is not available".to_owned())
                })?,
            ),
            None => None,
        };

        let shipping_address = match (&pickup, request.shipping_address.is_empty()) {
            (Some(point), true) => point.address.clone(),
            _ => request.shipping_address.clone(),
        };

        let order = sqlx::query_as::<_, Order>(&format!(
            "INSERT INTO orders (customer_id, shipping_address, delivery_date, pickup_point_id,
                                 promo_code_id, discount_percent)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(customer_id)
        .bind(&shipping_address)
        .bind(request.delivery_date)
        .bind(pickup.as_ref().map(|p| p.id))
        .bind(promo.as_ref().map(|p| p.id))
        .bind(quote.discount_percent)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_write(e, "order already exists"))?;

        let book_ids: Vec<BookId> = quote.lines.iter().map(|l| l.book_id).collect();
        let prices: Vec<Decimal> = quote.lines.iter().map(|l| l.unit_price).collect();
        let quantities: Vec<i32> = quote.lines.iter().map(|l| l.quantity).collect();

        sqlx::query(
            "INSERT INTO order_items (order_id, book_id, price, quantity)
             SELECT $1, v.book_id, v.price, v.quantity
             FROM UNNEST($2::INTEGER[], $3::NUMERIC[], $4::INTEGER[]) AS v(book_id, price, quantity)",
        )
        .bind(order.id)
        .bind(&book_ids)
        .bind(&prices)
        .bind(&quantities)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE books SET quantity = books.quantity - v.quantity, updated_at = now()
             FROM UNNEST($1::INTEGER[], $2::INTEGER[]) AS v(book_id, quantity)
             WHERE books.id = v.book_id",
        )
        .bind(&book_ids)
        .bind(&quantities)
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_write(e, "stock changed during checkout"))?;

        sqlx::query(
            "DELETE FROM cart_items ci USING carts c WHERE ci.cart_id = c.id AND c.user_id = $1",
        )
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        let items = self.items(order.id).await?;
        Ok(OrderDetail::new(
            order,
            items,
            pickup,
            promo.map(|p| p.code),
        ))
    }

    /// A customer's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_for_customer(
        &self,
        customer_id: CustomerId,
        page: PageRequest,
    ) -> Result<Page<OrderSummary>, RepositoryError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*)::BIGINT FROM orders WHERE customer_id = $1")
                .bind(customer_id)
                .fetch_one(self.pool)
                .await?;

        let orders = sqlx::query_as::<_, OrderSummary>(
            "SELECT o.id, o.created_at, o.delivery_date, o.discount_percent,
                    COALESCE(SUM(oi.quantity), 0)::BIGINT AS item_count,
                    COALESCE(SUM(oi.price * oi.quantity), 0)::NUMERIC(12, 2) AS subtotal
             FROM orders o
             LEFT JOIN order_items oi ON oi.order_id = o.id
             WHERE o.customer_id = $1
             GROUP BY o.id
             ORDER BY o.created_at DESC, o.id DESC
             LIMIT $2 OFFSET $3",
        )
        .bind(customer_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.pool)
        .await?;

        Ok(Page::new(orders, count, page))
    }

    /// One order with its items, if it belongs to the customer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_for_customer(
        &self,
        customer_id: CustomerId,
        id: OrderId,
    ) -> Result<Option<OrderDetail>, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1 AND customer_id = $2"
        ))
        .bind(id)
        .bind(customer_id)
        .fetch_optional(self.pool)
        .await?;

        let Some(order) = order else {
            return Ok(None);
        };

        let items = self.items(order.id).await?;

        let pickup = match order.pickup_point_id {
            Some(point) => {
                sqlx::query_as::<_, PickupPoint>(
                    "SELECT id, name, address FROM pickup_points WHERE id = $1",
                )
                .bind(point)
                .fetch_optional(self.pool)
                .await?
            }
            None => None,
        };

        let promo_code = match order.promo_code_id {
            Some(promo) => {
                sqlx::query_scalar("SELECT code FROM promo_codes WHERE id = $1")
                    .bind(promo)
                    .fetch_optional(self.pool)
                    .await?
            }
            None => None,
        };

        Ok(Some(OrderDetail::new(order, items, pickup, promo_code)))
    }

    async fn items(&self, order_id: OrderId) -> Result<Vec<OrderItem>, RepositoryError> {
        let items = sqlx::query_as::<_, OrderItem>(
            "SELECT oi.id, oi.book_id, b.title, oi.price, oi.quantity
             FROM order_items oi
             JOIN books b ON b.id = oi.book_id
             WHERE oi.order_id = $1
             ORDER BY oi.id",
        )
        .bind(order_id)
        .fetch_all(self.pool)
        .await?;
        Ok(items)
    }
}
