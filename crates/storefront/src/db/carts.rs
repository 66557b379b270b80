//! Persistent carts, one per user.
//!
//! Every mutation locks the book row `FOR UPDATE` before consulting the stock
//! rules in `heavyshop_core::cart`, so two concurrent adds cannot both pass
//! the stock check.

use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use tracing::instrument;

use heavyshop_core::cart::{CartLine, QuantityChange, check_add, check_update};
use heavyshop_core::{BookId, CartId, UserId};

use super::RepositoryError;
use crate::models::CartView;

#[derive(sqlx::FromRow)]
struct CartLineRow {
    book_id: BookId,
    title: String,
    unit_price: Decimal,
    quantity: i32,
    stock: i32,
}

impl From<CartLineRow> for CartLine {
    fn from(row: CartLineRow) -> Self {
        Self {
            book_id: row.book_id,
            title: row.title,
            unit_price: row.unit_price,
            quantity: row.quantity,
            stock: row.stock,
        }
    }
}

const LINES_SQL: &str = "SELECT ci.book_id, b.title, b.price AS unit_price, ci.quantity, \
     b.quantity AS stock \
     FROM carts c \
     JOIN cart_items ci ON ci.cart_id = c.id \
     JOIN books b ON b.id = ci.book_id \
     WHERE c.user_id = $1 \
     ORDER BY ci.created_at, ci.id";

/// Locks the books of a user's cart in id order, so concurrent checkouts
/// sharing books always queue in the same order.
const LOCK_BOOKS_SQL: &str = "SELECT b.id FROM carts c \
     JOIN cart_items ci ON ci.cart_id = c.id \
     JOIN books b ON b.id = ci.book_id \
     WHERE c.user_id = $1 \
     ORDER BY b.id \
     FOR UPDATE OF b";

async fn ensure_cart(conn: &mut PgConnection, user_id: UserId) -> Result<CartId, sqlx::Error> {
    sqlx::query_scalar(
        "INSERT INTO carts (user_id) VALUES ($1)
         ON CONFLICT (user_id) DO UPDATE SET updated_at = now()
         RETURNING id",
    )
    .bind(user_id)
    .fetch_one(conn)
    .await
}

/// Lock a book row and return its stock.
async fn lock_stock(conn: &mut PgConnection, book_id: BookId) -> Result<i32, RepositoryError> {
    sqlx::query_scalar("SELECT quantity FROM books WHERE id = $1 FOR UPDATE")
        .bind(book_id)
        .fetch_optional(conn)
        .await?
        .ok_or(RepositoryError::NotFound)
}

pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the user's cart ID, creating the cart on first use.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_or_create(&self, user_id: UserId) -> Result<CartId, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        Ok(ensure_cart(&mut conn, user_id).await?)
    }

    /// Cart lines joined with current book price and stock.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn lines(&self, user_id: UserId) -> Result<Vec<CartLine>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartLineRow>(LINES_SQL)
            .bind(user_id)
            .fetch_all(self.pool)
            .await?;
        Ok(rows.into_iter().map(CartLine::from).collect())
    }

    /// The cart with totals, ready for display.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn view(&self, user_id: UserId) -> Result<CartView, RepositoryError> {
        Ok(CartView::from_lines(&self.lines(user_id).await?))
    }

    /// Add copies of a book, merging with an existing line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for an unknown book and
    /// `RepositoryError::Validation` when stock rules refuse the change.
    #[instrument(skip(self), fields(user_id = %user_id, book_id = %book_id))]
    pub async fn add(
        &self,
        user_id: UserId,
        book_id: BookId,
        quantity: i32,
    ) -> Result<CartView, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let cart_id = ensure_cart(&mut tx, user_id).await?;
        let stock = lock_stock(&mut tx, book_id).await?;

        let in_cart: i32 = sqlx::query_scalar(
            "SELECT quantity FROM cart_items WHERE cart_id = $1 AND book_id = $2",
        )
        .bind(cart_id)
        .bind(book_id)
        .fetch_optional(&mut *tx)
        .await?
        .unwrap_or(0);

        let new_quantity = check_add(in_cart, quantity, stock)
            .map_err(|e| RepositoryError::Validation(e.to_string()))?;

        sqlx::query(
            "INSERT INTO cart_items (cart_id, book_id, quantity) VALUES ($1, $2, $3)
             ON CONFLICT (cart_id, book_id) DO UPDATE SET quantity = EXCLUDED.quantity",
        )
        .bind(cart_id)
        .bind(book_id)
        .bind(new_quantity)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        tracing::debug!(quantity = new_quantity, "Cart line updated");
        self.view(user_id).await
    }

    /// Replace a line's quantity; zero or less removes the line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the book isn't in the cart and
    /// `RepositoryError::Validation` when the quantity exceeds stock.
    #[instrument(skip(self), fields(user_id = %user_id, book_id = %book_id))]
    pub async fn set_quantity(
        &self,
        user_id: UserId,
        book_id: BookId,
        quantity: i32,
    ) -> Result<CartView, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let cart_id = ensure_cart(&mut tx, user_id).await?;

        let in_cart: Option<i32> = sqlx::query_scalar(
            "SELECT quantity FROM cart_items WHERE cart_id = $1 AND book_id = $2",
        )
        .bind(cart_id)
        .bind(book_id)
        .fetch_optional(&mut *tx)
        .await?;
        if in_cart.is_none() {
            return Err(RepositoryError::NotFound);
        }

        let stock = lock_stock(&mut tx, book_id).await?;
        let change = check_update(quantity, stock)
            .map_err(|e| RepositoryError::Validation(e.to_string()))?;

        let affected = match change {
            QuantityChange::Remove => {
                sqlx::query("DELETE FROM cart_items WHERE cart_id = $1 AND book_id = $2")
                    .bind(cart_id)
                    .bind(book_id)
                    .execute(&mut *tx)
                    .await?
            }
            QuantityChange::Set(q) => {
                sqlx::query(
                    "UPDATE cart_items SET quantity = $3 WHERE cart_id = $1 AND book_id = $2",
                )
                .bind(cart_id)
                .bind(book_id)
                .bind(q)
                .execute(&mut *tx)
                .await?
            }
        };
        if affected.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        tx.commit().await?;

        self.view(user_id).await
    }

    /// Drop a book from the cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the book isn't in the cart.
    pub async fn remove(
        &self,
        user_id: UserId,
        book_id: BookId,
    ) -> Result<CartView, RepositoryError> {
        let result = sqlx::query(
            "DELETE FROM cart_items ci USING carts c
             WHERE ci.cart_id = c.id AND c.user_id = $1 AND ci.book_id = $2",
        )
        .bind(user_id)
        .bind(book_id)
        .execute(self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        self.view(user_id).await
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear(&self, user_id: UserId) -> Result<(), RepositoryError> {
        sqlx::query(
            "DELETE FROM cart_items ci USING carts c WHERE ci.cart_id = c.id AND c.user_id = $1",
        )
        .bind(user_id)
        .execute(self.pool)
        .await?;
        Ok(())
    }
}

/// Cart lines of a user with their book rows locked, for checkout.
pub(crate) async fn lock_lines(
    conn: &mut PgConnection,
    user_id: UserId,
) -> Result<Vec<CartLine>, sqlx::Error> {
    sqlx::query(LOCK_BOOKS_SQL)
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
    let rows = sqlx::query_as::<_, CartLineRow>(LINES_SQL)
        .bind(user_id)
        .fetch_all(conn)
        .await?;
    Ok(rows.into_iter().map(CartLine::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkout_locks_books_in_id_order() {
        assert!(LOCK_BOOKS_SQL.ends_with("ORDER BY b.id FOR UPDATE OF b"));
        assert!(!LINES_SQL.contains("FOR UPDATE"));
    }
}
