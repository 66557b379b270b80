//! Cart route handlers.
//!
//! Each user has one persistent cart. Stock rules refuse a change with a
//! message shown on the cart page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use heavyshop_core::BookId;

use crate::db::{CartRepository, RepositoryError};
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::{CartView, CurrentUser};
use crate::routes::{MessageQuery, redirect_with};
use crate::state::AppState;

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub quantity: Option<i32>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub quantity: i32,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartTemplate {
    pub current_user: Option<CurrentUser>,
    pub cart: CartView,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Turn a stock refusal into a message on the cart page.
fn after_change(
    result: std::result::Result<CartView, RepositoryError>,
    done: &str,
) -> Result<Response> {
    match result {
        Ok(_) => Ok(redirect_with("/cart", "success", done).into_response()),
        Err(RepositoryError::Validation(message)) => {
            Ok(redirect_with("/cart", "error", &message).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// Display the cart.
#[instrument(skip(state, user, query), fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<MessageQuery>,
) -> Result<impl IntoResponse> {
    let cart = CartRepository::new(state.pool()).view(user.id).await?;
    Ok(CartTemplate {
        current_user: Some(user),
        cart,
        error: query.error,
        success: query.success,
    })
}

/// Add copies of a book.
#[instrument(skip(state, user, form), fields(user_id = %user.id, book_id = %book_id))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(book_id): Path<BookId>,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let quantity = form.quantity.unwrap_or(1);
    let result = CartRepository::new(state.pool())
        .add(user.id, book_id, quantity)
        .await;
    after_change(result, "Book added to cart")
}

/// Set the quantity of a line. Zero removes it.
#[instrument(skip(state, user, form), fields(user_id = %user.id, book_id = %book_id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(book_id): Path<BookId>,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response> {
    let result = CartRepository::new(state.pool())
        .set_quantity(user.id, book_id, form.quantity)
        .await;
    after_change(result, "Cart updated")
}

/// Remove a line.
#[instrument(skip(state, user), fields(user_id = %user.id, book_id = %book_id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(book_id): Path<BookId>,
) -> Result<Response> {
    let result = CartRepository::new(state.pool())
        .remove(user.id, book_id)
        .await;
    after_change(result, "Book removed from cart")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::StatusCode;

    use super::*;
    use crate::error::AppError;

    fn empty_cart() -> CartView {
        CartView::from_lines(&[])
    }

    #[test]
    fn test_stock_refusal_becomes_message() {
        let response = after_change(
            Err(RepositoryError::Validation("Book is out of stock".to_owned())),
            "ok",
        )
        .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers()["location"],
            "/cart?error=Book+is+out+of+stock"
        );
    }

    #[test]
    fn test_success_message() {
        let response = after_change(Ok(empty_cart()), "Cart updated").unwrap();
        assert_eq!(response.headers()["location"], "/cart?success=Cart+updated");
    }

    #[test]
    fn test_missing_line_is_an_error() {
        let err = after_change(Err(RepositoryError::NotFound), "ok").unwrap_err();
        assert!(matches!(err, AppError::Database(RepositoryError::NotFound)));
    }
}
