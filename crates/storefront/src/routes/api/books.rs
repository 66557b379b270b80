//! Catalog API: books, authors, genres, publishers and search.

use axum::{
    Json, Router,
    extract::{Path, RawQuery, State},
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;
use tracing::instrument;

use heavyshop_core::BookId;
use heavyshop_core::catalog::{BookFilter, Page};

use crate::db::{BookRepository, TaxonomyRepository};
use crate::error::{ApiResult, AppError};
use crate::middleware::RequireStaff;
use crate::models::{Author, Book, Genre, NewAuthor, NewBook, NewGenre, NewPublisher, Publisher};
use crate::routes::PageParams;
use crate::routes::api::{ApiJson, ApiQuery, invalid};
use crate::routes::books::catalog_query;
use crate::state::AppState;

/// Build the catalog router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/books", get(list_books).post(create_book))
        .route(
            "/books/{id}",
            get(get_book).put(update_book).delete(delete_book),
        )
        .route("/authors", get(list_authors).post(create_author))
        .route("/genres", get(list_genres).post(create_genre))
        .route("/publishers", get(list_publishers).post(create_publisher))
        .route("/search", get(search))
}

/// `?search=&page=&page_size=` on taxonomy lists.
#[derive(Debug, Default, Deserialize)]
pub struct NameSearch {
    pub search: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl NameSearch {
    fn term(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    fn paging(&self) -> PageParams {
        PageParams {
            page: self.page,
            page_size: self.page_size,
        }
    }
}

async fn find_books(state: &AppState, raw: Option<&str>) -> ApiResult<Page<Book>> {
    let (query, page) = catalog_query(raw);
    let filter = BookFilter::from_query(&query);
    Ok(BookRepository::new(state.pool())
        .search(&filter, page)
        .await?)
}

// =============================================================================
// Books
// =============================================================================

#[instrument(skip(state, raw))]
pub async fn list_books(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> ApiResult<Json<Page<Book>>> {
    Ok(Json(find_books(&state, raw.as_deref()).await?))
}

/// Full-text style search; `q` and `search` are interchangeable.
#[instrument(skip(state, raw))]
pub async fn search(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> ApiResult<Json<Page<Book>>> {
    Ok(Json(find_books(&state, raw.as_deref()).await?))
}

#[instrument(skip(state), fields(book_id = %id))]
pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<BookId>,
) -> ApiResult<Json<Book>> {
    let book = BookRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("book {id}")))?;
    Ok(Json(book))
}

#[instrument(skip(state, staff, body), fields(user_id = %staff.id))]
pub async fn create_book(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    ApiJson(body): ApiJson<NewBook>,
) -> ApiResult<(StatusCode, Json<Book>)> {
    let input = body.validate().map_err(invalid)?;
    let book = BookRepository::new(state.pool()).create(&input).await?;
    tracing::info!(book_id = %book.id, "Book created");
    Ok((StatusCode::CREATED, Json(book)))
}

#[instrument(skip(state, staff, body), fields(user_id = %staff.id, book_id = %id))]
pub async fn update_book(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(id): Path<BookId>,
    ApiJson(body): ApiJson<NewBook>,
) -> ApiResult<Json<Book>> {
    let input = body.validate().map_err(invalid)?;
    let book = BookRepository::new(state.pool())
        .update(id, &input)
        .await?;
    Ok(Json(book))
}

#[instrument(skip(state, staff), fields(user_id = %staff.id, book_id = %id))]
pub async fn delete_book(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(id): Path<BookId>,
) -> ApiResult<StatusCode> {
    BookRepository::new(state.pool()).delete(id).await?;
    tracing::info!("Book deleted");
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Authors, genres, publishers
// =============================================================================

pub async fn list_authors(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<NameSearch>,
) -> ApiResult<Json<Page<Author>>> {
    let authors = TaxonomyRepository::new(state.pool())
        .authors(query.term())
        .await?;
    Ok(Json(Page::from_all(authors, query.paging().request())))
}

#[instrument(skip(state, staff, body), fields(user_id = %staff.id))]
pub async fn create_author(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    ApiJson(body): ApiJson<NewAuthor>,
) -> ApiResult<(StatusCode, Json<Author>)> {
    let author = TaxonomyRepository::new(state.pool())
        .create_author(body)
        .await?;
    Ok((StatusCode::CREATED, Json(author)))
}

pub async fn list_genres(State(state): State<AppState>) -> ApiResult<Json<Vec<Genre>>> {
    Ok(Json(TaxonomyRepository::new(state.pool()).genres().await?))
}

#[instrument(skip(state, staff, body), fields(user_id = %staff.id))]
pub async fn create_genre(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    ApiJson(body): ApiJson<NewGenre>,
) -> ApiResult<(StatusCode, Json<Genre>)> {
    let genre = TaxonomyRepository::new(state.pool())
        .create_genre(body)
        .await?;
    Ok((StatusCode::CREATED, Json(genre)))
}

pub async fn list_publishers(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<NameSearch>,
) -> ApiResult<Json<Page<Publisher>>> {
    let publishers = TaxonomyRepository::new(state.pool())
        .publishers(query.term())
        .await?;
    Ok(Json(Page::from_all(publishers, query.paging().request())))
}

#[instrument(skip(state, staff, body), fields(user_id = %staff.id))]
pub async fn create_publisher(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    ApiJson(body): ApiJson<NewPublisher>,
) -> ApiResult<(StatusCode, Json<Publisher>)> {
    let publisher = TaxonomyRepository::new(state.pool())
        .create_publisher(body)
        .await?;
    Ok((StatusCode::CREATED, Json(publisher)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_search_term() {
        let query = NameSearch {
            search: Some("  ".to_owned()),
            ..NameSearch::default()
        };
        assert!(query.term().is_none());

        let query = NameSearch {
            search: Some(" Bulgakov".to_owned()),
            page: Some(2),
            page_size: Some(5),
        };
        assert_eq!(query.term(), Some("Bulgakov"));
        assert_eq!(query.paging().request().offset(), 5);
    }
}
