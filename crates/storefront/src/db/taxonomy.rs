//! Authors, genres and publishers.

use sqlx::PgPool;

use heavyshop_core::AuthorId;

use super::RepositoryError;
use crate::models::{Author, Genre, NewAuthor, NewGenre, NewPublisher, Publisher};
use crate::models::book::require_name;

pub struct TaxonomyRepository<'a> {
    pool: &'a PgPool,
}

fn contains_pattern(search: Option<&str>) -> Option<String> {
    search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            let escaped = s
                .replace('\\', "\\\\")
                .replace('%', "\\%")
                .replace('_', "\\_");
            format!("%{escaped}%")
        })
}

impl<'a> TaxonomyRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List authors, optionally filtered by a name substring.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn authors(&self, search: Option<&str>) -> Result<Vec<Author>, RepositoryError> {
        let authors = sqlx::query_as::<_, Author>(
            "SELECT id, name, bio, photo FROM authors
             WHERE $1::TEXT IS NULL OR name ILIKE $1
             ORDER BY name, id",
        )
        .bind(contains_pattern(search))
        .fetch_all(self.pool)
        .await?;
        Ok(authors)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_author(&self, id: AuthorId) -> Result<Option<Author>, RepositoryError> {
        let author =
            sqlx::query_as::<_, Author>("SELECT id, name, bio, photo FROM authors WHERE id = $1")
                .bind(id)
                .fetch_optional(self.pool)
                .await?;
        Ok(author)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` for a blank name.
    pub async fn create_author(&self, input: NewAuthor) -> Result<Author, RepositoryError> {
        let name = require_name(&input.name, 200).map_err(RepositoryError::Validation)?;
        let author = sqlx::query_as::<_, Author>(
            "INSERT INTO authors (name, bio, photo) VALUES ($1, $2, $3)
             RETURNING id, name, bio, photo",
        )
        .bind(name)
        .bind(input.bio.trim())
        .bind(input.photo.as_deref().filter(|p| !p.is_empty()))
        .fetch_one(self.pool)
        .await?;
        Ok(author)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn genres(&self) -> Result<Vec<Genre>, RepositoryError> {
        let genres = sqlx::query_as::<_, Genre>(
            "SELECT id, name, description FROM genres ORDER BY name, id",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(genres)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a genre with this name exists.
    pub async fn create_genre(&self, input: NewGenre) -> Result<Genre, RepositoryError> {
        let name = require_name(&input.name, 100).map_err(RepositoryError::Validation)?;
        sqlx::query_as::<_, Genre>(
            "INSERT INTO genres (name, description) VALUES ($1, $2)
             RETURNING id, name, description",
        )
        .bind(name)
        .bind(input.description.trim())
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "genre already exists"))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn publishers(
        &self,
        search: Option<&str>,
    ) -> Result<Vec<Publisher>, RepositoryError> {
        let publishers = sqlx::query_as::<_, Publisher>(
            "SELECT id, name, address, website FROM publishers
             WHERE $1::TEXT IS NULL OR name ILIKE $1
             ORDER BY name, id",
        )
        .bind(contains_pattern(search))
        .fetch_all(self.pool)
        .await?;
        Ok(publishers)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` for a blank name.
    pub async fn create_publisher(
        &self,
        input: NewPublisher,
    ) -> Result<Publisher, RepositoryError> {
        let name = require_name(&input.name, 200).map_err(RepositoryError::Validation)?;
        let publisher = sqlx::query_as::<_, Publisher>(
            "INSERT INTO publishers (name, address, website) VALUES ($1, $2, $3)
             RETURNING id, name, address, website",
        )
        .bind(name)
        .bind(input.address.trim())
        .bind(input.website.trim())
        .fetch_one(self.pool)
        .await?;
        Ok(publisher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_pattern() {
        assert_eq!(contains_pattern(None), None);
        assert_eq!(contains_pattern(Some("  ")), None);
        assert_eq!(contains_pattern(Some("Tol")).as_deref(), Some("%Tol%"));
        assert_eq!(contains_pattern(Some("50%")).as_deref(), Some("%50\\%%"));
    }
}
