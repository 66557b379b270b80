//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                          - Home page (news, banners, widgets, calendar)
//!
//! # Catalog
//! GET  /books                     - Catalog with search, genre, price, sort
//! GET  /books/{id}                - Book detail with approved reviews
//! POST /books/{id}/reviews        - Submit a review (goes to moderation)
//! POST /reviews/{id}/edit         - Edit own review
//! POST /reviews/{id}/delete       - Delete own review
//!
//! # Cart and orders
//! GET  /cart                      - Cart page
//! POST /cart/add/{book_id}        - Add copies
//! POST /cart/update/{book_id}     - Set quantity (0 removes)
//! POST /cart/remove/{book_id}     - Remove line
//! GET  /checkout                  - Checkout form
//! POST /checkout                  - Place order
//! GET  /orders                    - Order history
//! GET  /orders/{id}               - Order detail
//!
//! # Content
//! GET  /about /news /news/{id} /terms /contacts /privacy /faq
//! GET  /vacancies /promocodes
//! GET  /reviews                   - Shop reviews
//! POST /reviews                   - Submit a shop review
//!
//! # Auth and account
//! GET  /auth/login /auth/register, POST the same, POST /auth/logout
//! GET  /account/profile, POST     - User and customer profile
//!
//! # Staff
//! GET  /admin/reviews             - Moderation queue
//! POST /admin/reviews/{id}/{action}, /admin/customer-reviews/{id}/{action}
//! GET  /admin/vacancies, /admin/vacancies/new, /admin/vacancies/{id}/edit
//! POST /admin/vacancies/new, /admin/vacancies/{id}/edit, /admin/vacancies/{id}/delete
//! GET  /admin/statistics          - Sales statistics
//!
//! # JSON API
//! /api/...                        - See `api` module
//! ```

pub mod account;
pub mod admin;
pub mod api;
pub mod auth;
pub mod books;
pub mod cart;
pub mod home;
pub mod orders;
pub mod pages;
pub mod reviews;

use axum::{
    Router,
    response::Redirect,
    routing::{get, post},
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use heavyshop_core::catalog::PageRequest;

use crate::middleware::{api_rate_limiter, auth_rate_limiter};
use crate::state::AppState;

/// Flash-style message carried in the query string.
#[derive(Debug, Default, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// `?page=&page_size=` values.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl PageParams {
    #[must_use]
    pub fn request(&self) -> PageRequest {
        PageRequest::new(self.page, self.page_size)
    }
}

/// Redirect to `path` with `?error=` or `?success=` set.
pub(crate) fn redirect_with(path: &str, key: &str, message: &str) -> Redirect {
    let encoded: String = url::form_urlencoded::byte_serialize(message.as_bytes()).collect();
    let separator = if path.contains('?') { '&' } else { '?' };
    Redirect::to(&format!("{path}{separator}{key}={encoded}"))
}

/// Today's date in UTC.
pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Create the catalog routes router.
pub fn book_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(books::index))
        .route("/{id}", get(books::show))
        .route("/{id}/reviews", post(books::submit_review))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add/{book_id}", post(cart::add))
        .route("/update/{book_id}", post(cart::update))
        .route("/remove/{book_id}", post(cart::remove))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout))
        .layer(auth_rate_limiter())
}

/// Create the staff routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/reviews", get(admin::reviews))
        .route("/reviews/{id}/{action}", post(admin::moderate_review))
        .route(
            "/customer-reviews/{id}/{action}",
            post(admin::moderate_customer_review),
        )
        .route("/vacancies", get(admin::vacancies))
        .route(
            "/vacancies/new",
            get(admin::new_vacancy).post(admin::create_vacancy),
        )
        .route(
            "/vacancies/{id}/edit",
            get(admin::edit_vacancy).post(admin::update_vacancy),
        )
        .route("/vacancies/{id}/delete", post(admin::delete_vacancy))
        .route("/statistics", get(admin::statistics))
}

/// Create the content page routes router.
pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/about", get(pages::about))
        .route("/news", get(pages::news))
        .route("/news/{id}", get(pages::article))
        .route("/terms", get(pages::terms))
        .route("/contacts", get(pages::contacts))
        .route("/privacy", get(pages::privacy))
        .route("/faq", get(pages::faq))
        .route("/vacancies", get(pages::vacancies))
        .route("/promocodes", get(pages::promocodes))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .nest("/books", book_routes())
        .route(
            "/reviews",
            get(reviews::shop_reviews).post(reviews::submit_shop_review),
        )
        .route("/reviews/{id}/edit", post(reviews::edit))
        .route("/reviews/{id}/delete", post(reviews::delete))
        .nest("/cart", cart_routes())
        .route("/checkout", get(orders::checkout_page).post(orders::checkout))
        .route("/orders", get(orders::index))
        .route("/orders/{id}", get(orders::show))
        .merge(page_routes())
        .nest("/auth", auth_routes())
        .route(
            "/account/profile",
            get(account::profile_page).post(account::update_profile),
        )
        .nest("/admin", admin_routes())
        .nest("/api", api::routes().layer(api_rate_limiter()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::response::IntoResponse;

    use super::*;

    #[test]
    fn test_redirect_with_encodes_message() {
        let response = redirect_with("/cart", "error", "Not enough books in stock").into_response();
        assert_eq!(
            response.headers()["location"],
            "/cart?error=Not+enough+books+in+stock"
        );
    }

    #[test]
    fn test_redirect_with_existing_query() {
        let response = redirect_with("/books?page=2", "success", "ok").into_response();
        assert_eq!(response.headers()["location"], "/books?page=2&success=ok");
    }
}
