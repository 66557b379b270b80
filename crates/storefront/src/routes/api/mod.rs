//! JSON API handlers, mounted under `/api`.
//!
//! Lists are paginated with `?page=&page_size=` and answer
//! `{count, page, pages, results}`. Errors are `{"error": "..."}`.

pub mod books;
pub mod cart;
pub mod content;
pub mod customer;
pub mod orders;
pub mod reviews;
pub mod stats;

use axum::{
    Router,
    extract::{FromRequest, FromRequestParts},
};

use crate::error::{ApiError, AppError};
use crate::state::AppState;

/// `Json` that answers malformed bodies with a JSON error.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// `Query` that answers malformed query strings with a JSON error.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// Turn a failed input check into a 400.
pub(crate) fn invalid(message: String) -> ApiError {
    ApiError(AppError::Validation(message))
}

/// Build the complete API router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(books::router())
        .merge(cart::router())
        .merge(orders::router())
        .merge(reviews::router())
        .merge(content::router())
        .merge(stats::router())
        .merge(customer::router())
}
