//! Catalog route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, RawQuery, State},
    response::{IntoResponse, Response},
};
use tracing::instrument;

use heavyshop_core::catalog::{BookFilter, BookQuery, BookSort, Page, PageRequest};
use heavyshop_core::{BookId, GenreId};

use crate::db::{
    BookRepository, CustomerRepository, RepositoryError, ReviewRepository, TaxonomyRepository,
};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{OptionalAuth, RequireCustomer};
use crate::models::{Book, CurrentUser, NewReview, Review};
use crate::routes::{MessageQuery, PageParams, redirect_with};
use crate::state::AppState;

// =============================================================================
// Query Parsing
// =============================================================================

/// Parse a catalog query string.
///
/// Repeated `genres` values (one per checked box) are merged into the same
/// comma-separated list the API accepts.
pub(crate) fn catalog_query(raw: Option<&str>) -> (BookQuery, PageRequest) {
    let mut query = BookQuery::default();
    let mut genres: Vec<String> = Vec::new();
    let (mut page, mut page_size) = (None, None);

    for (key, value) in url::form_urlencoded::parse(raw.unwrap_or_default().as_bytes()) {
        let value = value.into_owned();
        match key.as_ref() {
            "search" | "q" => query.search = Some(value),
            "genres" => genres.push(value),
            "min_price" => query.min_price = Some(value),
            "max_price" => query.max_price = Some(value),
            "sort_by" => query.sort_by = Some(value),
            "page" => page = value.parse().ok(),
            "page_size" => page_size = value.parse().ok(),
            _ => {}
        }
    }
    if !genres.is_empty() {
        query.genres = Some(genres.join(","));
    }

    (query, PageRequest::new(page, page_size))
}

/// Link to another page of the same listing.
fn page_link(raw: Option<&str>, page: u32) -> String {
    let mut out = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in url::form_urlencoded::parse(raw.unwrap_or_default().as_bytes()) {
        if key != "page" {
            out.append_pair(&key, &value);
        }
    }
    out.append_pair("page", &page.to_string());
    format!("/books?{}", out.finish())
}

// =============================================================================
// Templates
// =============================================================================

/// A genre checkbox in the filter form.
pub struct GenreOption {
    pub id: GenreId,
    pub name: String,
    pub checked: bool,
}

/// A sort choice in the filter form.
pub struct SortOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// Catalog page template.
#[derive(Template, WebTemplate)]
#[template(path = "books/index.html")]
pub struct BookListTemplate {
    pub current_user: Option<CurrentUser>,
    pub books: Page<Book>,
    pub genres: Vec<GenreOption>,
    pub sort_options: Vec<SortOption>,
    pub search: String,
    pub min_price: String,
    pub max_price: String,
    pub prev_url: Option<String>,
    pub next_url: Option<String>,
}

/// Book detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "books/show.html")]
pub struct BookDetailTemplate {
    pub current_user: Option<CurrentUser>,
    pub book: Book,
    pub reviews: Page<Review>,
    pub own_review: Option<Review>,
    pub has_profile: bool,
    pub error: Option<String>,
    pub success: Option<String>,
}

// =============================================================================
// Routes
// =============================================================================

/// Display the catalog.
#[instrument(skip(state, current_user, raw))]
pub async fn index(
    State(state): State<AppState>,
    OptionalAuth(current_user): OptionalAuth,
    RawQuery(raw): RawQuery,
) -> Result<impl IntoResponse> {
    let (query, page_request) = catalog_query(raw.as_deref());
    let filter = BookFilter::from_query(&query);

    let books = BookRepository::new(state.pool())
        .search(&filter, page_request)
        .await?;
    let genres = TaxonomyRepository::new(state.pool())
        .genres()
        .await?
        .into_iter()
        .map(|g| GenreOption {
            checked: filter.genre_ids.contains(&g.id),
            id: g.id,
            name: g.name,
        })
        .collect();
    let sort_options = BookSort::options()
        .into_iter()
        .map(|(sort, label)| SortOption {
            value: sort.as_param(),
            label,
            selected: sort == filter.sort,
        })
        .collect();

    let prev_url = books
        .has_previous()
        .then(|| page_link(raw.as_deref(), books.page - 1));
    let next_url = books
        .has_next()
        .then(|| page_link(raw.as_deref(), books.page + 1));

    Ok(BookListTemplate {
        current_user,
        books,
        genres,
        sort_options,
        search: filter.search.unwrap_or_default(),
        min_price: filter.min_price.map(|p| p.to_string()).unwrap_or_default(),
        max_price: filter.max_price.map(|p| p.to_string()).unwrap_or_default(),
        prev_url,
        next_url,
    })
}

/// Display a book with one page of its approved reviews.
#[instrument(skip(state, current_user, query, paging), fields(book_id = %id))]
pub async fn show(
    State(state): State<AppState>,
    OptionalAuth(current_user): OptionalAuth,
    Path(id): Path<BookId>,
    Query(query): Query<MessageQuery>,
    Query(paging): Query<PageParams>,
) -> Result<impl IntoResponse> {
    let book = BookRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("book {id}")))?;

    let reviews = ReviewRepository::new(state.pool());
    let approved = reviews.approved(Some(id), paging.request()).await?;

    let customer = match &current_user {
        Some(user) => CustomerRepository::new(state.pool())
            .get_by_user(user.id)
            .await?,
        None => None,
    };
    let own_review = match &customer {
        Some(customer) => reviews.own_for_book(id, customer.id).await?,
        None => None,
    };

    Ok(BookDetailTemplate {
        current_user,
        book,
        reviews: approved,
        own_review,
        has_profile: customer.is_some(),
        error: query.error,
        success: query.success,
    })
}

/// Handle the review form on a book page.
#[instrument(skip(state, auth, form), fields(book_id = %id, customer_id = %auth.customer.id))]
pub async fn submit_review(
    State(state): State<AppState>,
    auth: RequireCustomer,
    Path(id): Path<BookId>,
    Form(form): Form<NewReview>,
) -> Result<Response> {
    let back = format!("/books/{id}");
    let (rating, comment) = match form.validate() {
        Ok(valid) => valid,
        Err(message) => return Ok(redirect_with(&back, "error", &message).into_response()),
    };

    match ReviewRepository::new(state.pool())
        .create(id, auth.customer.id, rating, &comment)
        .await
    {
        Ok(review) => {
            tracing::info!(review_id = %review.id, "Review submitted for moderation");
            Ok(redirect_with(
                &back,
                "success",
                "Thank you! Your review will appear after moderation.",
            )
            .into_response())
        }
        Err(RepositoryError::Conflict(message) | RepositoryError::Validation(message)) => {
            Ok(redirect_with(&back, "error", &message).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_query_merges_genre_checkboxes() {
        let (query, page) =
            catalog_query(Some("q=tolstoy&genres=3&genres=1&sort_by=-price&page=2"));
        assert_eq!(query.search.as_deref(), Some("tolstoy"));
        assert_eq!(query.genres.as_deref(), Some("3,1"));
        assert_eq!(query.sort_by.as_deref(), Some("-price"));
        assert_eq!(page.page, 2);

        let filter = BookFilter::from_query(&query);
        assert_eq!(filter.genre_ids, vec![GenreId::new(1), GenreId::new(3)]);
        assert_eq!(filter.sort, BookSort::PriceDesc);
    }

    #[test]
    fn test_catalog_query_empty() {
        let (query, page) = catalog_query(None);
        assert!(query.search.is_none());
        assert!(query.genres.is_none());
        assert_eq!(page, PageRequest::default());
    }

    #[test]
    fn test_page_link_replaces_page() {
        assert_eq!(
            page_link(Some("search=war+and+peace&page=1"), 3),
            "/books?search=war+and+peace&page=3"
        );
        assert_eq!(page_link(None, 2), "/books?page=2");
    }
}
