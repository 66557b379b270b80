//! Review API: book reviews, shop reviews and approval.
//!
//! New reviews stay hidden until staff approve them; lists only show
//! approved ones.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;
use tracing::instrument;

use heavyshop_core::catalog::Page;
use heavyshop_core::{BookId, ReviewId};

use crate::db::ReviewRepository;
use crate::error::ApiResult;
use crate::middleware::{RequireCustomer, RequireStaff};
use crate::models::{CustomerReview, NewCustomerReview, NewReview, Review};
use crate::routes::PageParams;
use crate::routes::api::{ApiJson, ApiQuery, invalid};
use crate::state::AppState;

/// Build the reviews router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/reviews", get(list).post(create))
        .route("/books/{id}/reviews", get(list_for_book).post(create_for_book))
        .route("/reviews/{id}/approve", post(approve))
        .route(
            "/customer-reviews",
            get(list_customer_reviews).post(create_customer_review),
        )
}

/// Review body for `POST /api/reviews`, which names the book.
#[derive(Debug, Deserialize)]
pub struct BookReviewRequest {
    pub book_id: BookId,
    #[serde(flatten)]
    pub review: NewReview,
}

async fn submit(
    state: &AppState,
    customer: &RequireCustomer,
    book_id: BookId,
    review: NewReview,
) -> ApiResult<(StatusCode, Json<Review>)> {
    let (rating, comment) = review.validate().map_err(invalid)?;
    let review = ReviewRepository::new(state.pool())
        .create(book_id, customer.customer.id, rating, &comment)
        .await?;
    tracing::info!(review_id = %review.id, book_id = %book_id, "Review submitted for moderation");
    Ok((StatusCode::CREATED, Json(review)))
}

pub async fn list(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<PageParams>,
) -> ApiResult<Json<Page<Review>>> {
    let reviews = ReviewRepository::new(state.pool())
        .approved(None, params.request())
        .await?;
    Ok(Json(reviews))
}

#[instrument(skip(state, auth, body), fields(customer_id = %auth.customer.id))]
pub async fn create(
    State(state): State<AppState>,
    auth: RequireCustomer,
    ApiJson(body): ApiJson<BookReviewRequest>,
) -> ApiResult<(StatusCode, Json<Review>)> {
    submit(&state, &auth, body.book_id, body.review).await
}

pub async fn list_for_book(
    State(state): State<AppState>,
    Path(id): Path<BookId>,
    ApiQuery(params): ApiQuery<PageParams>,
) -> ApiResult<Json<Page<Review>>> {
    let reviews = ReviewRepository::new(state.pool())
        .approved(Some(id), params.request())
        .await?;
    Ok(Json(reviews))
}

#[instrument(skip(state, auth, body), fields(customer_id = %auth.customer.id, book_id = %id))]
pub async fn create_for_book(
    State(state): State<AppState>,
    auth: RequireCustomer,
    Path(id): Path<BookId>,
    ApiJson(body): ApiJson<NewReview>,
) -> ApiResult<(StatusCode, Json<Review>)> {
    submit(&state, &auth, id, body).await
}

/// Publish a pending review.
#[instrument(skip(state, staff), fields(user_id = %staff.id, review_id = %id))]
pub async fn approve(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(id): Path<ReviewId>,
) -> ApiResult<Json<serde_json::Value>> {
    ReviewRepository::new(state.pool()).approve(id).await?;
    tracing::info!("Review approved");
    Ok(Json(serde_json::json!({ "message": "Review approved" })))
}

pub async fn list_customer_reviews(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<PageParams>,
) -> ApiResult<Json<Page<CustomerReview>>> {
    let reviews = ReviewRepository::new(state.pool())
        .approved_customer_reviews(params.request())
        .await?;
    Ok(Json(reviews))
}

#[instrument(skip(state, auth, body), fields(customer_id = %auth.customer.id))]
pub async fn create_customer_review(
    State(state): State<AppState>,
    auth: RequireCustomer,
    ApiJson(body): ApiJson<NewCustomerReview>,
) -> ApiResult<(StatusCode, Json<CustomerReview>)> {
    let (rating, title, text) = body.validate().map_err(invalid)?;
    let review = ReviewRepository::new(state.pool())
        .create_customer_review(auth.customer.id, rating, &title, &text)
        .await?;
    Ok((StatusCode::CREATED, Json(review)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_book_review_body_is_flat() {
        let body: BookReviewRequest =
            serde_json::from_str(r#"{"book_id": 4, "rating": 5, "comment": "Superb"}"#).unwrap();
        assert_eq!(body.book_id, BookId::new(4));
        assert_eq!(body.review.rating, 5);
        assert_eq!(body.review.comment, "Superb");
    }

    #[test]
    fn test_out_of_range_rating_is_rejected() {
        let body: BookReviewRequest =
            serde_json::from_str(r#"{"book_id": 4, "rating": 9, "comment": "Superb"}"#).unwrap();
        assert!(body.review.validate().is_err());
    }
}
