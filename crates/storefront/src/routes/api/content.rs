//! Read-only company content API, plus staff article writes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;
use tracing::instrument;

use heavyshop_core::ArticleId;
use heavyshop_core::catalog::Page;

use crate::db::ContentRepository;
use crate::error::{ApiResult, AppError};
use crate::middleware::RequireStaff;
use crate::models::{
    Article, Banner, Employee, Faq, HistoryEntry, NewArticle, Partner, PickupPoint, Term,
};
use crate::routes::PageParams;
use crate::routes::api::{ApiJson, ApiQuery, invalid};
use crate::state::AppState;

/// Build the content router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/banners", get(banners))
        .route("/partners", get(partners))
        .route("/company-history", get(company_history))
        .route("/faqs", get(faqs))
        .route("/articles", get(articles).post(create_article))
        .route(
            "/articles/{id}",
            get(article).put(update_article).delete(delete_article),
        )
        .route("/terms", get(terms))
        .route("/employees", get(employees))
        .route("/pickup-points", get(pickup_points))
}

/// `?search=&category=&page=&page_size=` on content lists.
#[derive(Debug, Default, Deserialize)]
pub struct ContentQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl ContentQuery {
    fn search(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    fn category(&self) -> Option<&str> {
        self.category.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    fn paginate<T>(&self, all: Vec<T>) -> Page<T> {
        let params = PageParams {
            page: self.page,
            page_size: self.page_size,
        };
        Page::from_all(all, params.request())
    }
}

pub async fn banners(State(state): State<AppState>) -> ApiResult<Json<Vec<Banner>>> {
    Ok(Json(ContentRepository::new(state.pool()).banners().await?))
}

pub async fn partners(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ContentQuery>,
) -> ApiResult<Json<Page<Partner>>> {
    let partners = ContentRepository::new(state.pool()).partners().await?;
    Ok(Json(query.paginate(partners)))
}

pub async fn company_history(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ContentQuery>,
) -> ApiResult<Json<Page<HistoryEntry>>> {
    let history = ContentRepository::new(state.pool()).history().await?;
    Ok(Json(query.paginate(history)))
}

pub async fn faqs(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ContentQuery>,
) -> ApiResult<Json<Page<Faq>>> {
    let faqs = ContentRepository::new(state.pool())
        .faqs(query.category(), query.search())
        .await?;
    Ok(Json(query.paginate(faqs)))
}

pub async fn terms(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ContentQuery>,
) -> ApiResult<Json<Page<Term>>> {
    let terms = ContentRepository::new(state.pool())
        .terms(query.search())
        .await?;
    Ok(Json(query.paginate(terms)))
}

pub async fn employees(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ContentQuery>,
) -> ApiResult<Json<Page<Employee>>> {
    let employees = ContentRepository::new(state.pool()).employees().await?;
    Ok(Json(query.paginate(employees)))
}

pub async fn pickup_points(State(state): State<AppState>) -> ApiResult<Json<Vec<PickupPoint>>> {
    Ok(Json(
        ContentRepository::new(state.pool()).pickup_points().await?,
    ))
}

// =============================================================================
// Articles
// =============================================================================

pub async fn articles(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ContentQuery>,
) -> ApiResult<Json<Page<Article>>> {
    let articles = ContentRepository::new(state.pool())
        .articles(query.search())
        .await?;
    Ok(Json(query.paginate(articles)))
}

#[instrument(skip(state), fields(article_id = %id))]
pub async fn article(
    State(state): State<AppState>,
    Path(id): Path<ArticleId>,
) -> ApiResult<Json<Article>> {
    let article = ContentRepository::new(state.pool())
        .article(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("article {id}")))?;
    Ok(Json(article))
}

#[instrument(skip(state, staff, body), fields(user_id = %staff.id))]
pub async fn create_article(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    ApiJson(body): ApiJson<NewArticle>,
) -> ApiResult<(StatusCode, Json<Article>)> {
    let input = body.validate().map_err(invalid)?;
    let article = ContentRepository::new(state.pool())
        .create_article(&input)
        .await?;
    tracing::info!(article_id = %article.id, "Article published");
    Ok((StatusCode::CREATED, Json(article)))
}

#[instrument(skip(state, staff, body), fields(user_id = %staff.id, article_id = %id))]
pub async fn update_article(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(id): Path<ArticleId>,
    ApiJson(body): ApiJson<NewArticle>,
) -> ApiResult<Json<Article>> {
    let input = body.validate().map_err(invalid)?;
    let article = ContentRepository::new(state.pool())
        .update_article(id, &input)
        .await?;
    Ok(Json(article))
}

#[instrument(skip(state, staff), fields(user_id = %staff.id, article_id = %id))]
pub async fn delete_article(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(id): Path<ArticleId>,
) -> ApiResult<StatusCode> {
    ContentRepository::new(state.pool())
        .delete_article(id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_query_paginates() {
        let query = ContentQuery {
            page: Some(2),
            page_size: Some(2),
            ..ContentQuery::default()
        };
        let page = query.paginate(vec!["a", "b", "c"]);
        assert_eq!(page.results, vec!["c"]);
        assert_eq!(page.pages, 2);
    }

    #[test]
    fn test_blank_filters_are_ignored() {
        let query = ContentQuery {
            search: Some(" ".to_owned()),
            category: Some("delivery".to_owned()),
            ..ContentQuery::default()
        };
        assert!(query.search().is_none());
        assert_eq!(query.category(), Some("delivery"));
    }
}
