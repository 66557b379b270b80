//! Company content pages.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::instrument;

use heavyshop_core::ArticleId;

use crate::db::ContentRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::{
    Article, CompanyInfo, CurrentUser, Employee, Faq, HistoryEntry, Partner, PromoCode, Term,
    Vacancy,
};
use crate::routes::today;
use crate::state::AppState;

/// `?search=` on list pages.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default, alias = "q")]
    pub search: Option<String>,
}

impl SearchQuery {
    fn term(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// `?category=&search=` on the FAQ page.
#[derive(Debug, Default, Deserialize)]
pub struct FaqQuery {
    pub category: Option<String>,
    #[serde(default, alias = "q")]
    pub search: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

#[derive(Template, WebTemplate)]
#[template(path = "pages/about.html")]
pub struct AboutTemplate {
    pub current_user: Option<CurrentUser>,
    pub company: Option<CompanyInfo>,
    pub history: Vec<HistoryEntry>,
    pub partners: Vec<Partner>,
}

#[derive(Template, WebTemplate)]
#[template(path = "pages/news.html")]
pub struct NewsTemplate {
    pub current_user: Option<CurrentUser>,
    pub articles: Vec<Article>,
    pub search: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "pages/article.html")]
pub struct ArticleTemplate {
    pub current_user: Option<CurrentUser>,
    pub article: Article,
}

#[derive(Template, WebTemplate)]
#[template(path = "pages/terms.html")]
pub struct TermsTemplate {
    pub current_user: Option<CurrentUser>,
    pub terms: Vec<Term>,
    pub search: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "pages/contacts.html")]
pub struct ContactsTemplate {
    pub current_user: Option<CurrentUser>,
    pub company: Option<CompanyInfo>,
    pub employees: Vec<Employee>,
}

#[derive(Template, WebTemplate)]
#[template(path = "pages/privacy.html")]
pub struct PrivacyTemplate {
    pub current_user: Option<CurrentUser>,
}

#[derive(Template, WebTemplate)]
#[template(path = "pages/faq.html")]
pub struct FaqTemplate {
    pub current_user: Option<CurrentUser>,
    pub faqs: Vec<Faq>,
    pub category: String,
    pub search: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "pages/vacancies.html")]
pub struct VacanciesTemplate {
    pub current_user: Option<CurrentUser>,
    pub vacancies: Vec<Vacancy>,
}

#[derive(Template, WebTemplate)]
#[template(path = "pages/promocodes.html")]
pub struct PromoCodesTemplate {
    pub current_user: Option<CurrentUser>,
    pub valid: Vec<PromoCode>,
    pub archived: Vec<PromoCode>,
}

// =============================================================================
// Routes
// =============================================================================

#[instrument(skip(state, current_user))]
pub async fn about(
    State(state): State<AppState>,
    OptionalAuth(current_user): OptionalAuth,
) -> Result<impl IntoResponse> {
    let content = ContentRepository::new(state.pool());
    Ok(AboutTemplate {
        current_user,
        company: content.company_info().await?,
        history: content.history().await?,
        partners: content.partners().await?,
    })
}

#[instrument(skip(state, current_user))]
pub async fn news(
    State(state): State<AppState>,
    OptionalAuth(current_user): OptionalAuth,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse> {
    let articles = ContentRepository::new(state.pool())
        .articles(query.term())
        .await?;
    Ok(NewsTemplate {
        current_user,
        articles,
        search: query.term().unwrap_or_default().to_owned(),
    })
}

#[instrument(skip(state, current_user), fields(article_id = %id))]
pub async fn article(
    State(state): State<AppState>,
    OptionalAuth(current_user): OptionalAuth,
    Path(id): Path<ArticleId>,
) -> Result<impl IntoResponse> {
    let article = ContentRepository::new(state.pool())
        .article(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("article {id}")))?;
    Ok(ArticleTemplate {
        current_user,
        article,
    })
}

#[instrument(skip(state, current_user))]
pub async fn terms(
    State(state): State<AppState>,
    OptionalAuth(current_user): OptionalAuth,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse> {
    let terms = ContentRepository::new(state.pool())
        .terms(query.term())
        .await?;
    Ok(TermsTemplate {
        current_user,
        terms,
        search: query.term().unwrap_or_default().to_owned(),
    })
}

#[instrument(skip(state, current_user))]
pub async fn contacts(
    State(state): State<AppState>,
    OptionalAuth(current_user): OptionalAuth,
) -> Result<impl IntoResponse> {
    let content = ContentRepository::new(state.pool());
    Ok(ContactsTemplate {
        current_user,
        company: content.company_info().await?,
        employees: content.employees().await?,
    })
}

pub async fn privacy(OptionalAuth(current_user): OptionalAuth) -> impl IntoResponse {
    PrivacyTemplate { current_user }
}

#[instrument(skip(state, current_user))]
pub async fn faq(
    State(state): State<AppState>,
    OptionalAuth(current_user): OptionalAuth,
    Query(query): Query<FaqQuery>,
) -> Result<impl IntoResponse> {
    let category = query
        .category
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let faqs = ContentRepository::new(state.pool())
        .faqs(category, search)
        .await?;
    Ok(FaqTemplate {
        current_user,
        faqs,
        category: category.unwrap_or_default().to_owned(),
        search: search.unwrap_or_default().to_owned(),
    })
}

#[instrument(skip(state, current_user))]
pub async fn vacancies(
    State(state): State<AppState>,
    OptionalAuth(current_user): OptionalAuth,
) -> Result<impl IntoResponse> {
    let vacancies = ContentRepository::new(state.pool())
        .vacancies(false)
        .await?;
    Ok(VacanciesTemplate {
        current_user,
        vacancies,
    })
}

/// Valid promo codes first, then expired or disabled ones.
#[instrument(skip(state, current_user))]
pub async fn promocodes(
    State(state): State<AppState>,
    OptionalAuth(current_user): OptionalAuth,
) -> Result<impl IntoResponse> {
    let (valid, archived) = ContentRepository::new(state.pool())
        .promo_codes(today())
        .await?;
    Ok(PromoCodesTemplate {
        current_user,
        valid,
        archived,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_search_is_none() {
        let query = SearchQuery {
            search: Some("   ".to_owned()),
        };
        assert!(query.term().is_none());

        let query = SearchQuery {
            search: Some(" isbn ".to_owned()),
        };
        assert_eq!(query.term(), Some("isbn"));
    }
}
