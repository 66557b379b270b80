//! Book reviews and general shop reviews.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use heavyshop_core::{BookId, CustomerId, CustomerReviewId, Rating, ReviewId};

/// A review of one book. Hidden until a staff member approves it.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Review {
    pub id: ReviewId,
    pub book_id: BookId,
    pub book_title: String,
    pub customer_id: CustomerId,
    pub author_name: String,
    pub rating: i32,
    pub comment: String,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
}

impl Review {
    #[must_use]
    pub fn stars(&self) -> String {
        Rating::new(self.rating).map(Rating::stars).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewReview {
    pub rating: i32,
    pub comment: String,
}

impl NewReview {
    /// # Errors
    ///
    /// Rating outside 1-5 or an empty comment.
    pub fn validate(self) -> Result<(Rating, String), String> {
        let rating = Rating::new(self.rating).map_err(|e| e.to_string())?;
        let comment = self.comment.trim().to_owned();
        if comment.is_empty() {
            return Err("Comment cannot be empty".to_owned());
        }
        Ok((rating, comment))
    }
}

/// A review of the shop as a whole.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CustomerReview {
    pub id: CustomerReviewId,
    pub customer_id: CustomerId,
    pub author_name: String,
    pub rating: i32,
    pub title: String,
    pub text: String,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
}

impl CustomerReview {
    #[must_use]
    pub fn stars(&self) -> String {
        Rating::new(self.rating).map(Rating::stars).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCustomerReview {
    pub rating: i32,
    #[serde(default)]
    pub title: String,
    pub text: String,
}

impl NewCustomerReview {
    /// # Errors
    ///
    /// Rating outside 1-5, an empty text or an overlong title.
    pub fn validate(self) -> Result<(Rating, String, String), String> {
        let rating = Rating::new(self.rating).map_err(|e| e.to_string())?;
        let title = self.title.trim().to_owned();
        if title.chars().count() > 200 {
            return Err("Title must be at most 200 characters".to_owned());
        }
        let text = self.text.trim().to_owned();
        if text.is_empty() {
            return Err("Review text cannot be empty".to_owned());
        }
        Ok((rating, title, text))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_out_of_range_is_rejected() {
        for rating in [0, 6, -1] {
            let review = NewReview {
                rating,
                comment: "Great".to_owned(),
            };
            assert!(review.validate().is_err(), "rating {rating}");
        }
    }

    #[test]
    fn test_valid_review() {
        let (rating, comment) = NewReview {
            rating: 5,
            comment: " Loved it ".to_owned(),
        }
        .validate()
        .unwrap();
        assert_eq!(rating.value(), 5);
        assert_eq!(comment, "Loved it");
    }

    #[test]
    fn test_shop_review_needs_text() {
        let review = NewCustomerReview {
            rating: 4,
            title: "Nice".to_owned(),
            text: "   ".to_owned(),
        };
        assert!(review.validate().is_err());
    }
}
