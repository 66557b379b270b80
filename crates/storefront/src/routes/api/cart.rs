//! Cart API. Every mutation answers `{message, cart, currency}`.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post, put},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use heavyshop_core::BookId;

use crate::db::CartRepository;
use crate::error::{ApiResult, add_breadcrumb};
use crate::middleware::RequireAuth;
use crate::models::CartView;
use crate::routes::api::{ApiJson, invalid};
use crate::state::AppState;

/// Build the cart router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/cart", get(show))
        .route("/cart/add", post(add))
        .route("/cart/remove/{book_id}", delete(remove))
        .route("/cart/update/{book_id}", put(update))
}

#[derive(Debug, Deserialize)]
pub struct AddRequest {
    pub book_id: BookId,
    #[serde(default = "one")]
    pub quantity: i32,
}

const fn one() -> i32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    pub quantity: i32,
}

/// Response to a cart change.
#[derive(Debug, Serialize)]
pub struct CartChange {
    pub message: String,
    pub cart: CartView,
    pub currency: String,
}

impl CartChange {
    fn new(message: &str, cart: CartView, currency: &str) -> Json<Self> {
        Json(Self {
            message: message.to_owned(),
            cart,
            currency: currency.to_owned(),
        })
    }
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> ApiResult<Json<CartView>> {
    Ok(Json(CartRepository::new(state.pool()).view(user.id).await?))
}

#[instrument(skip(state, user, body), fields(user_id = %user.id, book_id = %body.book_id))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(body): ApiJson<AddRequest>,
) -> ApiResult<Json<CartChange>> {
    if body.quantity <= 0 {
        return Err(invalid("Quantity must be positive".to_owned()));
    }
    let cart = CartRepository::new(state.pool())
        .add(user.id, body.book_id, body.quantity)
        .await?;
    let book_id = body.book_id.to_string();
    add_breadcrumb("cart", "Added book to cart", Some(&[("book_id", &book_id)]));
    Ok(CartChange::new("Book added to cart", cart, state.currency()))
}

#[instrument(skip(state, user, body), fields(user_id = %user.id, book_id = %book_id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(book_id): Path<BookId>,
    ApiJson(body): ApiJson<UpdateRequest>,
) -> ApiResult<Json<CartChange>> {
    let cart = CartRepository::new(state.pool())
        .set_quantity(user.id, book_id, body.quantity)
        .await?;
    Ok(CartChange::new("Cart updated", cart, state.currency()))
}

#[instrument(skip(state, user), fields(user_id = %user.id, book_id = %book_id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(book_id): Path<BookId>,
) -> ApiResult<Json<CartChange>> {
    let cart = CartRepository::new(state.pool())
        .remove(user.id, book_id)
        .await?;
    Ok(CartChange::new("Book removed from cart", cart, state.currency()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_add_defaults_to_one_copy() {
        let body: AddRequest = serde_json::from_str(r#"{"book_id": 7}"#).unwrap();
        assert_eq!(body.book_id, BookId::new(7));
        assert_eq!(body.quantity, 1);
    }

    #[test]
    fn test_change_shape() {
        let Json(change) = CartChange::new("Cart updated", CartView::from_lines(&[]), "EUR");
        let value = serde_json::to_value(&change).unwrap();
        assert_eq!(value["message"], "Cart updated");
        assert_eq!(value["currency"], "EUR");
        assert!(value["cart"]["items"].as_array().unwrap().is_empty());
    }
}
