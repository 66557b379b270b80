//! Book reviews and shop reviews, both moderated by staff.

use sqlx::PgPool;
use tracing::instrument;

use heavyshop_core::catalog::{Page, PageRequest};
use heavyshop_core::{BookId, CustomerId, CustomerReviewId, Rating, ReviewId};

use super::RepositoryError;
use crate::models::{CustomerReview, Review};

const AUTHOR_NAME_SQL: &str =
    "COALESCE(NULLIF(TRIM(u.first_name || ' ' || u.last_name), ''), u.username)";

fn review_select() -> String {
    format!(
        "SELECT r.id, r.book_id, b.title AS book_title, r.customer_id, \
         {AUTHOR_NAME_SQL} AS author_name, r.rating, r.comment, r.is_approved, r.created_at \
         FROM reviews r \
         JOIN books b ON b.id = r.book_id \
         JOIN customers c ON c.id = r.customer_id \
         JOIN users u ON u.id = c.user_id"
    )
}

fn customer_review_select() -> String {
    format!(
        "SELECT r.id, r.customer_id, {AUTHOR_NAME_SQL} AS author_name, r.rating, r.title, \
         r.text, r.is_approved, r.created_at \
         FROM customer_reviews r \
         JOIN customers c ON c.id = r.customer_id \
         JOIN users u ON u.id = c.user_id"
    )
}

pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ReviewId) -> Result<Option<Review>, RepositoryError> {
        let review = sqlx::query_as::<_, Review>(&format!("{} WHERE r.id = $1", review_select()))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(review)
    }

    /// Submit a review. It stays hidden until approved.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the customer already reviewed
    /// this book and `RepositoryError::Validation` for an unknown book.
    #[instrument(skip(self, comment), fields(book_id = %book_id, customer_id = %customer_id))]
    pub async fn create(
        &self,
        book_id: BookId,
        customer_id: CustomerId,
        rating: Rating,
        comment: &str,
    ) -> Result<Review, RepositoryError> {
        let id: ReviewId = sqlx::query_scalar(
            "INSERT INTO reviews (book_id, customer_id, rating, comment)
             VALUES ($1, $2, $3, $4)
             RETURNING id",
        )
        .bind(book_id)
        .bind(customer_id)
        .bind(rating.value())
        .bind(comment)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "You have already reviewed this book"))?;

        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// One page of approved reviews, newest first, optionally for one book.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn approved(
        &self,
        book_id: Option<BookId>,
        page: PageRequest,
    ) -> Result<Page<Review>, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*)::BIGINT FROM reviews
             WHERE is_approved AND ($1::INTEGER IS NULL OR book_id = $1)",
        )
        .bind(book_id)
        .fetch_one(self.pool)
        .await?;

        let reviews = sqlx::query_as::<_, Review>(&format!(
            "{} WHERE r.is_approved AND ($1::INTEGER IS NULL OR r.book_id = $1)
             ORDER BY r.created_at DESC, r.id DESC
             LIMIT $2 OFFSET $3",
            review_select()
        ))
        .bind(book_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.pool)
        .await?;

        Ok(Page::new(reviews, count, page))
    }

    /// The customer's own review of a book, approved or not.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn own_for_book(
        &self,
        book_id: BookId,
        customer_id: CustomerId,
    ) -> Result<Option<Review>, RepositoryError> {
        let review = sqlx::query_as::<_, Review>(&format!(
            "{} WHERE r.book_id = $1 AND r.customer_id = $2",
            review_select()
        ))
        .bind(book_id)
        .bind(customer_id)
        .fetch_optional(self.pool)
        .await?;
        Ok(review)
    }

    /// Reviews waiting for moderation, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn pending(&self) -> Result<Vec<Review>, RepositoryError> {
        let reviews = sqlx::query_as::<_, Review>(&format!(
            "{} WHERE NOT r.is_approved ORDER BY r.created_at, r.id",
            review_select()
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(reviews)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the review doesn't exist.
    pub async fn approve(&self, id: ReviewId) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE reviews SET is_approved = TRUE WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Rejecting a review deletes it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the review doesn't exist.
    pub async fn reject(&self, id: ReviewId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Edit a customer's own review. The edit goes back to moderation.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the review doesn't exist or
    /// belongs to someone else.
    pub async fn update_own(
        &self,
        id: ReviewId,
        customer_id: CustomerId,
        rating: Rating,
        comment: &str,
    ) -> Result<Review, RepositoryError> {
        let result = sqlx::query(
            "UPDATE reviews SET rating = $3, comment = $4, is_approved = FALSE
             WHERE id = $1 AND customer_id = $2",
        )
        .bind(id)
        .bind(customer_id)
        .bind(rating.value())
        .bind(comment)
        .execute(self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Delete a customer's own review and return the book it was on.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the review doesn't exist or
    /// belongs to someone else.
    pub async fn delete_own(
        &self,
        id: ReviewId,
        customer_id: CustomerId,
    ) -> Result<BookId, RepositoryError> {
        sqlx::query_scalar(
            "DELETE FROM reviews WHERE id = $1 AND customer_id = $2 RETURNING book_id",
        )
        .bind(id)
        .bind(customer_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Submit a shop review.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create_customer_review(
        &self,
        customer_id: CustomerId,
        rating: Rating,
        title: &str,
        text: &str,
    ) -> Result<CustomerReview, RepositoryError> {
        let id: CustomerReviewId = sqlx::query_scalar(
            "INSERT INTO customer_reviews (customer_id, rating, title, text)
             VALUES ($1, $2, $3, $4)
             RETURNING id",
        )
        .bind(customer_id)
        .bind(rating.value())
        .bind(title)
        .bind(text)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "review already exists"))?;

        sqlx::query_as::<_, CustomerReview>(&format!(
            "{} WHERE r.id = $1",
            customer_review_select()
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// One page of approved shop reviews, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn approved_customer_reviews(
        &self,
        page: PageRequest,
    ) -> Result<Page<CustomerReview>, RepositoryError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*)::BIGINT FROM customer_reviews WHERE is_approved")
                .fetch_one(self.pool)
                .await?;

        let reviews = sqlx::query_as::<_, CustomerReview>(&format!(
            "{} WHERE r.is_approved ORDER BY r.created_at DESC, r.id DESC LIMIT $1 OFFSET $2",
            customer_review_select()
        ))
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.pool)
        .await?;

        Ok(Page::new(reviews, count, page))
    }

    /// Shop reviews waiting for moderation, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn pending_customer_reviews(&self) -> Result<Vec<CustomerReview>, RepositoryError> {
        let reviews = sqlx::query_as::<_, CustomerReview>(&format!(
            "{} WHERE NOT r.is_approved ORDER BY r.created_at, r.id",
            customer_review_select()
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(reviews)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the review doesn't exist.
    pub async fn approve_customer_review(
        &self,
        id: CustomerReviewId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE customer_reviews SET is_approved = TRUE WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Rejecting a shop review deletes it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the review doesn't exist.
    pub async fn reject_customer_review(
        &self,
        id: CustomerReviewId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM customer_reviews WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
