//! Catalog types: books and their authors, genres and publishers.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use heavyshop_core::{AuthorId, BookId, GenreId, Isbn, PublisherId, format_price};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Author {
    pub id: AuthorId,
    pub name: String,
    pub bio: String,
    pub photo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Genre {
    pub id: GenreId,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Publisher {
    pub id: PublisherId,
    pub name: String,
    pub address: String,
    pub website: String,
}

/// A `books` row with its review aggregates.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BookRow {
    pub id: BookId,
    pub title: String,
    pub publisher_id: Option<PublisherId>,
    pub isbn: String,
    pub description: String,
    pub price: Decimal,
    pub quantity: i32,
    pub cover: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Average of approved review ratings.
    pub avg_rating: Option<Decimal>,
    /// Number of approved reviews.
    pub review_count: i64,
}

/// A book with its relations loaded.
#[derive(Debug, Clone, Serialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub authors: Vec<Author>,
    pub genres: Vec<Genre>,
    pub publisher: Option<Publisher>,
    pub isbn: String,
    pub description: String,
    pub price: Decimal,
    pub quantity: i32,
    pub cover: Option<String>,
    pub avg_rating: Option<Decimal>,
    pub review_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Book {
    #[must_use]
    pub fn from_row(
        row: BookRow,
        authors: Vec<Author>,
        genres: Vec<Genre>,
        publisher: Option<Publisher>,
    ) -> Self {
        Self {
            id: row.id,
            title: row.title,
            authors,
            genres,
            publisher,
            isbn: row.isbn,
            description: row.description,
            price: row.price,
            quantity: row.quantity,
            cover: row.cover,
            avg_rating: row.avg_rating.map(|r| r.round_dp(2)),
            review_count: row.review_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }

    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.quantity > 0
    }

    /// Comma-separated author names.
    #[must_use]
    pub fn author_names(&self) -> String {
        self.authors
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    #[must_use]
    pub fn price_display(&self) -> String {
        format_price(self.price)
    }

    /// Average rating with one decimal, or a dash when unrated.
    #[must_use]
    pub fn rating_display(&self) -> String {
        self.avg_rating
            .map_or_else(|| "-".to_owned(), |r| format!("{:.1}", r.round_dp(1)))
    }
}

/// Create or replace a book.
#[derive(Debug, Clone, Deserialize)]
pub struct NewBook {
    pub title: String,
    #[serde(default)]
    pub author_ids: Vec<AuthorId>,
    #[serde(default)]
    pub genre_ids: Vec<GenreId>,
    pub publisher_id: Option<PublisherId>,
    pub isbn: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub quantity: i32,
    pub cover: Option<String>,
}

impl NewBook {
    pub const MAX_TITLE: usize = 200;

    /// Check field rules and normalise the ISBN.
    ///
    /// Foreign keys are checked by the repository.
    ///
    /// # Errors
    ///
    /// Returns a user-facing message for the first invalid field.
    pub fn validate(mut self) -> Result<Self, String> {
        self.title = self.title.trim().to_owned();
        if self.title.is_empty() {
            return Err("Title is required".to_owned());
        }
        if self.title.chars().count() > Self::MAX_TITLE {
            return Err(format!("Title must be at most {} characters", Self::MAX_TITLE));
        }
        if self.author_ids.is_empty() {
            return Err("A book needs at least one author".to_owned());
        }
        self.isbn = Isbn::parse(&self.isbn)
            .map_err(|e| e.to_string())?
            .to_string();
        if self.price.is_sign_negative() {
            return Err("Price cannot be negative".to_owned());
        }
        if self.quantity < 0 {
            return Err("Quantity cannot be negative".to_owned());
        }
        self.author_ids.sort_unstable();
        self.author_ids.dedup();
        self.genre_ids.sort_unstable();
        self.genre_ids.dedup();
        Ok(self)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewAuthor {
    pub name: String,
    #[serde(default)]
    pub bio: String,
    pub photo: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewGenre {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPublisher {
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub website: String,
}

/// Reject blank names for taxonomy entries.
///
/// # Errors
///
/// Returns a message naming the field.
pub fn require_name(name: &str, max: usize) -> Result<String, String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Name is required".to_owned());
    }
    if name.chars().count() > max {
        return Err(format!("Name must be at most {max} characters"));
    }
    Ok(name.to_owned())
}
