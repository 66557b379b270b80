//! Review route handlers: editing own book reviews and shop reviews.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use tracing::instrument;

use heavyshop_core::ReviewId;
use heavyshop_core::catalog::Page;

use crate::db::{CustomerRepository, ReviewRepository};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{OptionalAuth, RequireCustomer};
use crate::models::{CurrentUser, CustomerReview, NewCustomerReview, NewReview};
use crate::routes::{MessageQuery, PageParams, redirect_with};
use crate::state::AppState;

/// Shop reviews page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/reviews.html")]
pub struct ShopReviewsTemplate {
    pub current_user: Option<CurrentUser>,
    pub reviews: Page<CustomerReview>,
    pub has_profile: bool,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Edit the caller's own book review. The edit goes back to moderation.
#[instrument(skip(state, auth, form), fields(review_id = %id, customer_id = %auth.customer.id))]
pub async fn edit(
    State(state): State<AppState>,
    auth: RequireCustomer,
    Path(id): Path<ReviewId>,
    Form(form): Form<NewReview>,
) -> Result<Response> {
    let reviews = ReviewRepository::new(state.pool());
    let existing = reviews
        .get(id)
        .await?
        .filter(|r| r.customer_id == auth.customer.id)
        .ok_or_else(|| AppError::NotFound(format!("review {id}")))?;
    let back = format!("/books/{}", existing.book_id);

    let (rating, comment) = match form.validate() {
        Ok(valid) => valid,
        Err(message) => return Ok(redirect_with(&back, "error", &message).into_response()),
    };
    reviews
        .update_own(id, auth.customer.id, rating, &comment)
        .await?;

    Ok(redirect_with(
        &back,
        "success",
        "Your review was updated and will appear after moderation.",
    )
    .into_response())
}

/// Delete the caller's own book review.
#[instrument(skip(state, auth), fields(review_id = %id, customer_id = %auth.customer.id))]
pub async fn delete(
    State(state): State<AppState>,
    auth: RequireCustomer,
    Path(id): Path<ReviewId>,
) -> Result<Response> {
    let book_id = ReviewRepository::new(state.pool())
        .delete_own(id, auth.customer.id)
        .await?;
    Ok(redirect_with(
        &format!("/books/{book_id}"),
        "success",
        "Your review was deleted.",
    )
    .into_response())
}

/// Display approved shop reviews and the review form.
#[instrument(skip(state, current_user, query, paging))]
pub async fn shop_reviews(
    State(state): State<AppState>,
    OptionalAuth(current_user): OptionalAuth,
    Query(query): Query<MessageQuery>,
    Query(paging): Query<PageParams>,
) -> Result<impl IntoResponse> {
    let reviews = ReviewRepository::new(state.pool())
        .approved_customer_reviews(paging.request())
        .await?;
    let has_profile = match &current_user {
        Some(user) => CustomerRepository::new(state.pool())
            .get_by_user(user.id)
            .await?
            .is_some(),
        None => false,
    };

    Ok(ShopReviewsTemplate {
        current_user,
        reviews,
        has_profile,
        error: query.error,
        success: query.success,
    })
}

/// Handle the shop review form.
#[instrument(skip(state, auth, form), fields(customer_id = %auth.customer.id))]
pub async fn submit_shop_review(
    State(state): State<AppState>,
    auth: RequireCustomer,
    Form(form): Form<NewCustomerReview>,
) -> Result<Response> {
    let (rating, title, text) = match form.validate() {
        Ok(valid) => valid,
        Err(message) => return Ok(redirect_with("/reviews", "error", &message).into_response()),
    };

    ReviewRepository::new(state.pool())
        .create_customer_review(auth.customer.id, rating, &title, &text)
        .await?;

    Ok(redirect_with(
        "/reviews",
        "success",
        "Thank you! Your review will appear after moderation.",
    )
    .into_response())
}
