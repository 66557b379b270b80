//! Book repository: catalog search and book CRUD.
//!
//! Relations are loaded in batches with `= ANY($1)` after the main query so a
//! page of books costs four round trips regardless of its size.

use std::collections::HashMap;

use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;

use heavyshop_core::catalog::{BookFilter, Page, PageRequest};
use heavyshop_core::{AuthorId, BookId, GenreId, PublisherId};

use super::RepositoryError;
use crate::models::book::BookRow;
use crate::models::{Author, Book, Genre, NewBook, Publisher};

const BOOK_SELECT: &str = "SELECT b.id, b.title, b.publisher_id, b.isbn, b.description, \
     b.price, b.quantity, b.cover, b.created_at, b.updated_at, \
     (SELECT AVG(r.rating) FROM reviews r WHERE r.book_id = b.id AND r.is_approved) AS avg_rating, \
     (SELECT COUNT(*) FROM reviews r WHERE r.book_id = b.id AND r.is_approved)::BIGINT AS review_count \
     FROM books b";

#[derive(sqlx::FromRow)]
struct BookAuthorRow {
    book_id: BookId,
    #[sqlx(flatten)]
    author: Author,
}

#[derive(sqlx::FromRow)]
struct BookGenreRow {
    book_id: BookId,
    #[sqlx(flatten)]
    genre: Genre,
}

/// Append the `WHERE` clause for a catalog filter to a query over `books b`.
fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &BookFilter) {
    qb.push(" WHERE TRUE");

    if let Some(pattern) = filter.like_pattern() {
        qb.push(" AND (b.title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR b.description ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR b.isbn ILIKE ")
            .push_bind(pattern.clone())
            .push(
                " OR EXISTS (SELECT 1 FROM book_authors ba JOIN authors a ON a.id = ba.author_id \
                 WHERE ba.book_id = b.id AND a.name ILIKE ",
            )
            .push_bind(pattern)
            .push("))");
    }

    if !filter.genre_ids.is_empty() {
        qb.push(
            " AND EXISTS (SELECT 1 FROM book_genres bg WHERE bg.book_id = b.id AND bg.genre_id = ANY(",
        )
        .push_bind(filter.genre_ids.clone())
        .push("))");
    }

    if let Some(min) = filter.min_price {
        qb.push(" AND b.price >= ").push_bind(min);
    }
    if let Some(max) = filter.max_price {
        qb.push(" AND b.price <= ").push_bind(max);
    }
}

/// Repository for catalog queries and book writes.
pub struct BookRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> BookRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Search the catalog.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    #[instrument(skip(self))]
    pub async fn search(
        &self,
        filter: &BookFilter,
        page: PageRequest,
    ) -> Result<Page<Book>, RepositoryError> {
        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*)::BIGINT FROM books b");
        push_filters(&mut count_qb, filter);
        let count: i64 = count_qb.build_query_scalar().fetch_one(self.pool).await?;

        let mut qb = QueryBuilder::<Postgres>::new(BOOK_SELECT);
        push_filters(&mut qb, filter);
        qb.push(" ORDER BY ")
            .push(filter.sort.order_by_sql())
            .push(" LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());
        let rows: Vec<BookRow> = qb.build_query_as().fetch_all(self.pool).await?;

        let books = self.attach_relations(rows).await?;
        Ok(Page::new(books, count, page))
    }

    /// Get a book with its authors, genres, publisher and rating.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get(&self, id: BookId) -> Result<Option<Book>, RepositoryError> {
        let row = sqlx::query_as::<_, BookRow>(&format!("{BOOK_SELECT} WHERE b.id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        Ok(self.attach_relations(vec![row]).await?.pop())
    }

    /// Books with the best average approved rating.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn top_rated(&self, limit: i64) -> Result<Vec<Book>, RepositoryError> {
        let rows = sqlx::query_as::<_, BookRow>(&format!(
            "SELECT * FROM ({BOOK_SELECT}) ranked
             WHERE review_count > 0
             ORDER BY avg_rating DESC, review_count DESC, id
             LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        self.attach_relations(rows).await
    }

    /// Most recently added books.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn latest(&self, limit: i64) -> Result<Vec<Book>, RepositoryError> {
        let rows = sqlx::query_as::<_, BookRow>(&format!(
            "{BOOK_SELECT} ORDER BY b.created_at DESC, b.id DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        self.attach_relations(rows).await
    }

    /// Create a book. The input must already be validated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` if an author, genre or publisher
    /// does not exist.
    #[instrument(skip(self, book), fields(title = %book.title))]
    pub async fn create(&self, book: &NewBook) -> Result<Book, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        check_references(&mut tx, book).await?;

        let id: BookId = sqlx::query_scalar(
            "INSERT INTO books (title, publisher_id, isbn, description, price, quantity, cover)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING id",
        )
        .bind(&book.title)
        .bind(book.publisher_id)
        .bind(&book.isbn)
        .bind(&book.description)
        .bind(book.price)
        .bind(book.quantity)
        .bind(book.cover.as_deref().filter(|c| !c.is_empty()))
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_write(e, "book already exists"))?;

        insert_relations(&mut tx, id, &book.author_ids, &book.genre_ids).await?;
        tx.commit().await?;

        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Replace every field and relation of a book.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the book doesn't exist.
    /// Returns `RepositoryError::Validation` for a missing reference.
    #[instrument(skip(self, book), fields(book_id = %id))]
    pub async fn update(&self, id: BookId, book: &NewBook) -> Result<Book, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        check_references(&mut tx, book).await?;

        let updated = sqlx::query(
            "UPDATE books SET title = $2, publisher_id = $3, isbn = $4, description = $5,
                 price = $6, quantity = $7, cover = $8, updated_at = now()
             WHERE id = $1",
        )
        .bind(id)
        .bind(&book.title)
        .bind(book.publisher_id)
        .bind(&book.isbn)
        .bind(&book.description)
        .bind(book.price)
        .bind(book.quantity)
        .bind(book.cover.as_deref().filter(|c| !c.is_empty()))
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_write(e, "book already exists"))?;

        if updated.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        sqlx::query("DELETE FROM book_authors WHERE book_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM book_genres WHERE book_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        insert_relations(&mut tx, id, &book.author_ids, &book.genre_ids).await?;
        tx.commit().await?;

        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the book doesn't exist.
    pub async fn delete(&self, id: BookId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn attach_relations(&self, rows: Vec<BookRow>) -> Result<Vec<Book>, RepositoryError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<BookId> = rows.iter().map(|r| r.id).collect();
        let publisher_ids: Vec<PublisherId> = rows.iter().filter_map(|r| r.publisher_id).collect();

        let author_rows = sqlx::query_as::<_, BookAuthorRow>(
            "SELECT ba.book_id, a.id, a.name, a.bio, a.photo
             FROM book_authors ba
             JOIN authors a ON a.id = ba.author_id
             WHERE ba.book_id = ANY($1)
             ORDER BY a.name, a.id",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let genre_rows = sqlx::query_as::<_, BookGenreRow>(
            "SELECT bg.book_id, g.id, g.name, g.description
             FROM book_genres bg
             JOIN genres g ON g.id = bg.genre_id
             WHERE bg.book_id = ANY($1)
             ORDER BY g.name, g.id",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let publishers = if publisher_ids.is_empty() {
            Vec::new()
        } else {
            sqlx::query_as::<_, Publisher>(
                "SELECT id, name, address, website FROM publishers WHERE id = ANY($1)",
            )
            .bind(&publisher_ids)
            .fetch_all(self.pool)
            .await?
        };

        let mut authors: HashMap<BookId, Vec<Author>> = HashMap::new();
        for row in author_rows {
            authors.entry(row.book_id).or_default().push(row.author);
        }
        let mut genres: HashMap<BookId, Vec<Genre>> = HashMap::new();
        for row in genre_rows {
            genres.entry(row.book_id).or_default().push(row.genre);
        }
        let publishers: HashMap<PublisherId, Publisher> =
            publishers.into_iter().map(|p| (p.id, p)).collect();

        Ok(rows
            .into_iter()
            .map(|row| {
                let id = row.id;
                let publisher = row.publisher_id.and_then(|p| publishers.get(&p).cloned());
                Book::from_row(
                    row,
                    authors.remove(&id).unwrap_or_default(),
                    genres.remove(&id).unwrap_or_default(),
                    publisher,
                )
            })
            .collect())
    }
}

/// Reject books that point at authors, genres or a publisher that don't exist.
async fn check_references(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    book: &NewBook,
) -> Result<(), RepositoryError> {
    let authors: i64 =
        sqlx::query_scalar("SELECT COUNT(*)::BIGINT FROM authors WHERE id = ANY($1)")
            .bind(&book.author_ids)
            .fetch_one(&mut **tx)
            .await?;
    if usize::try_from(authors).unwrap_or(0) != book.author_ids.len() {
        return Err(RepositoryError::Validation(
            "One or more authors do not exist".to_owned(),
        ));
    }

    let genres: i64 = sqlx::query_scalar("SELECT COUNT(*)::BIGINT FROM genres WHERE id = ANY($1)")
        .bind(&book.genre_ids)
        .fetch_one(&mut **tx)
        .await?;
    if usize::try_from(genres).unwrap_or(0) != book.genre_ids.len() {
        return Err(RepositoryError::Validation(
            "One or more genres do not exist".to_owned(),
        ));
    }

    if let Some(publisher_id) = book.publisher_id {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM publishers WHERE id = $1)")
                .bind(publisher_id)
                .fetch_one(&mut **tx)
                .await?;
        if !exists {
            return Err(RepositoryError::Validation(
                "Publisher does not exist".to_owned(),
            ));
        }
    }
    Ok(())
}

async fn insert_relations(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    book_id: BookId,
    author_ids: &[AuthorId],
    genre_ids: &[GenreId],
) -> Result<(), RepositoryError> {
    sqlx::query("INSERT INTO book_authors (book_id, author_id) SELECT $1, UNNEST($2::INTEGER[])")
        .bind(book_id)
        .bind(author_ids)
        .execute(&mut **tx)
        .await?;
    sqlx::query("INSERT INTO book_genres (book_id, genre_id) SELECT $1, UNNEST($2::INTEGER[])")
        .bind(book_id)
        .bind(genre_ids)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use heavyshop_core::catalog::{BookQuery, BookSort};

    use super::*;

    fn sql_for(filter: &BookFilter) -> String {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM books b");
        push_filters(&mut qb, filter);
        qb.sql().to_owned()
    }

    #[test]
    fn test_empty_filter_has_no_conditions() {
        assert_eq!(
            sql_for(&BookFilter::default()),
            "SELECT COUNT(*) FROM books b WHERE TRUE"
        );
    }

    #[test]
    fn test_filter_binds_every_condition() {
        let filter = BookFilter::from_query(&BookQuery {
            search: Some("tolstoy".to_owned()),
            genres: Some("2,1".to_owned()),
            min_price: Some("5".to_owned()),
            max_price: Some("30".to_owned()),
            sort_by: Some("-price".to_owned()),
        });
        let sql = sql_for(&filter);
        assert!(sql.contains("b.title ILIKE $1"));
        assert!(sql.contains("a.name ILIKE $4"));
        assert!(sql.contains("bg.genre_id = ANY($5)"));
        assert!(sql.contains("b.price >= $6"));
        assert!(sql.contains("b.price <= $7"));
        assert_eq!(filter.sort, BookSort::PriceDesc);
        assert_eq!(filter.min_price, Some(Decimal::new(5, 0)));
    }
}
