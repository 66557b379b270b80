//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use crate::db::{BookRepository, ContentRepository};
use crate::error::Result;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::{Article, Banner, Book, CurrentUser};
use crate::routes::today;
use crate::services::calendar::WEEKDAY_NAMES;
use crate::services::{HomeWidgets, MonthGrid};
use crate::state::AppState;

/// How many books each home page shelf shows.
const SHELF_SIZE: i64 = 4;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub current_user: Option<CurrentUser>,
    pub latest_article: Option<Article>,
    pub banners: Vec<Banner>,
    pub top_rated: Vec<Book>,
    pub new_arrivals: Vec<Book>,
    pub widgets: HomeWidgets,
    pub calendar: MonthGrid,
    pub weekdays: [&'static str; 7],
}

/// Display the home page.
#[instrument(skip(state, current_user))]
pub async fn home(
    State(state): State<AppState>,
    OptionalAuth(current_user): OptionalAuth,
) -> Result<impl IntoResponse> {
    let content = ContentRepository::new(state.pool());
    let books = BookRepository::new(state.pool());

    let latest_article = content.latest_article().await?;
    let banners = content.banners().await?;
    let top_rated = books.top_rated(SHELF_SIZE).await?;
    let new_arrivals = books.latest(SHELF_SIZE).await?;
    let widgets = state.widgets().home_widgets().await;

    Ok(HomeTemplate {
        current_user,
        latest_article,
        banners,
        top_rated,
        new_arrivals,
        widgets,
        calendar: MonthGrid::for_date(today()),
        weekdays: WEEKDAY_NAMES,
    })
}
