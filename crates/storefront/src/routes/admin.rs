//! Staff-only pages: review moderation, vacancies and sales statistics.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use chrono::Datelike;
use serde::Deserialize;
use tracing::instrument;

use heavyshop_core::stats::DateRange;
use heavyshop_core::{CustomerReviewId, ModerationAction, ReviewId, VacancyId};

use crate::db::{ContentRepository, ReviewRepository, StatsRepository};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireStaff;
use crate::models::{
    CurrentUser, CustomerReview, NewVacancy, Review, SalesOverview, SalesSnapshot,
    StatisticsReport, Vacancy,
};
use crate::routes::{MessageQuery, redirect_with, today};
use crate::state::AppState;

/// How many daily snapshots the statistics page lists.
const SNAPSHOT_ROWS: i64 = 30;

// =============================================================================
// Templates
// =============================================================================

#[derive(Template, WebTemplate)]
#[template(path = "admin/reviews.html")]
pub struct ModerationTemplate {
    pub current_user: Option<CurrentUser>,
    pub reviews: Vec<Review>,
    pub customer_reviews: Vec<CustomerReview>,
    pub error: Option<String>,
    pub success: Option<String>,
}

#[derive(Template, WebTemplate)]
#[template(path = "admin/vacancies.html")]
pub struct VacancyListTemplate {
    pub current_user: Option<CurrentUser>,
    pub vacancies: Vec<Vacancy>,
    pub success: Option<String>,
}

/// Create and edit share one form; `action` is where it posts.
#[derive(Template, WebTemplate)]
#[template(path = "admin/vacancy_form.html")]
pub struct VacancyFormTemplate {
    pub current_user: Option<CurrentUser>,
    pub heading: String,
    pub action: String,
    pub form: NewVacancy,
    pub error: Option<String>,
}

#[derive(Template, WebTemplate)]
#[template(path = "admin/statistics.html")]
pub struct StatisticsTemplate {
    pub current_user: Option<CurrentUser>,
    pub overview: SalesOverview,
    pub report: StatisticsReport,
    pub snapshots: Vec<SalesSnapshot>,
}

impl StatisticsTemplate {
    /// `(month, revenue)` rows of the monthly chart.
    #[must_use]
    pub fn months(&self) -> Vec<(&'static str, String)> {
        self.overview
            .monthly_sales
            .labelled()
            .map(|(label, total)| (label, heavyshop_core::format_price(total)))
            .collect()
    }
}

/// `?start_date=&end_date=` on the statistics page.
#[derive(Debug, Default, Deserialize)]
pub struct DateRangeQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl DateRangeQuery {
    /// The requested range. Missing or unparsable dates leave that side open,
    /// so no dates at all means all time.
    ///
    /// # Errors
    ///
    /// Returns a message when both dates are set and reversed.
    pub fn resolve(&self) -> std::result::Result<DateRange, String> {
        let range = DateRange::parse(self.start_date.as_deref(), self.end_date.as_deref());
        if range.is_reversed() {
            return Err("start_date must not be after end_date".to_owned());
        }
        Ok(range)
    }
}

fn vacancy_form(vacancy: &Vacancy) -> NewVacancy {
    NewVacancy {
        title: vacancy.title.clone(),
        description: vacancy.description.clone(),
        requirements: vacancy.requirements.clone(),
        salary: vacancy.salary.clone(),
        is_active: vacancy.is_active.then(|| "on".to_owned()),
    }
}

// =============================================================================
// Moderation
// =============================================================================

/// Display reviews waiting for moderation.
#[instrument(skip(state, staff, query), fields(user_id = %staff.id))]
pub async fn reviews(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Query(query): Query<MessageQuery>,
) -> Result<impl IntoResponse> {
    let repo = ReviewRepository::new(state.pool());
    Ok(ModerationTemplate {
        current_user: Some(staff),
        reviews: repo.pending().await?,
        customer_reviews: repo.pending_customer_reviews().await?,
        error: query.error,
        success: query.success,
    })
}

/// Approve or reject a book review.
#[instrument(skip(state, staff), fields(user_id = %staff.id))]
pub async fn moderate_review(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path((id, action)): Path<(ReviewId, String)>,
) -> Result<Redirect> {
    let action: ModerationAction = action.parse().map_err(AppError::BadRequest)?;
    let repo = ReviewRepository::new(state.pool());
    match action {
        ModerationAction::Approve => repo.approve(id).await?,
        ModerationAction::Reject => repo.reject(id).await?,
    }
    tracing::info!(review_id = %id, action = %action, "Review moderated");
    Ok(redirect_with("/admin/reviews", "success", &format!("Review {id}: {action}d")))
}

/// Approve or reject a shop review.
#[instrument(skip(state, staff), fields(user_id = %staff.id))]
pub async fn moderate_customer_review(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path((id, action)): Path<(CustomerReviewId, String)>,
) -> Result<Redirect> {
    let action: ModerationAction = action.parse().map_err(AppError::BadRequest)?;
    let repo = ReviewRepository::new(state.pool());
    match action {
        ModerationAction::Approve => repo.approve_customer_review(id).await?,
        ModerationAction::Reject => repo.reject_customer_review(id).await?,
    }
    tracing::info!(customer_review_id = %id, action = %action, "Shop review moderated");
    Ok(redirect_with(
        "/admin/reviews",
        "success",
        &format!("Shop review {id}: {action}d"),
    ))
}

// =============================================================================
// Vacancies
// =============================================================================

/// List all vacancies, inactive ones included.
#[instrument(skip(state, staff, query), fields(user_id = %staff.id))]
pub async fn vacancies(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Query(query): Query<MessageQuery>,
) -> Result<impl IntoResponse> {
    let vacancies = ContentRepository::new(state.pool())
        .vacancies(true)
        .await?;
    Ok(VacancyListTemplate {
        current_user: Some(staff),
        vacancies,
        success: query.success,
    })
}

pub async fn new_vacancy(RequireStaff(staff): RequireStaff) -> impl IntoResponse {
    VacancyFormTemplate {
        current_user: Some(staff),
        heading: "New vacancy".to_owned(),
        action: "/admin/vacancies/new".to_owned(),
        form: NewVacancy {
            is_active: Some("on".to_owned()),
            ..NewVacancy::default()
        },
        error: None,
    }
}

#[instrument(skip(state, staff, form), fields(user_id = %staff.id))]
pub async fn create_vacancy(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Form(form): Form<NewVacancy>,
) -> Result<Response> {
    let input = match form.clone().validate() {
        Ok(input) => input,
        Err(message) => {
            return Ok(VacancyFormTemplate {
                current_user: Some(staff),
                heading: "New vacancy".to_owned(),
                action: "/admin/vacancies/new".to_owned(),
                form,
                error: Some(message),
            }
            .into_response());
        }
    };
    let vacancy = ContentRepository::new(state.pool())
        .create_vacancy(&input)
        .await?;
    tracing::info!(vacancy_id = %vacancy.id, "Vacancy created");
    Ok(redirect_with("/admin/vacancies", "success", "Vacancy created").into_response())
}

#[instrument(skip(state, staff), fields(user_id = %staff.id, vacancy_id = %id))]
pub async fn edit_vacancy(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(id): Path<VacancyId>,
) -> Result<impl IntoResponse> {
    let vacancy = ContentRepository::new(state.pool())
        .vacancy(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("vacancy {id}")))?;
    Ok(VacancyFormTemplate {
        current_user: Some(staff),
        heading: format!("Edit vacancy: {}", vacancy.title),
        action: format!("/admin/vacancies/{id}/edit"),
        form: vacancy_form(&vacancy),
        error: None,
    })
}

#[instrument(skip(state, staff, form), fields(user_id = %staff.id, vacancy_id = %id))]
pub async fn update_vacancy(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(id): Path<VacancyId>,
    Form(form): Form<NewVacancy>,
) -> Result<Response> {
    let input = match form.clone().validate() {
        Ok(input) => input,
        Err(message) => {
            return Ok(VacancyFormTemplate {
                current_user: Some(staff),
                heading: "Edit vacancy".to_owned(),
                action: format!("/admin/vacancies/{id}/edit"),
                form,
                error: Some(message),
            }
            .into_response());
        }
    };
    ContentRepository::new(state.pool())
        .update_vacancy(id, &input)
        .await?;
    Ok(redirect_with("/admin/vacancies", "success", "Vacancy updated").into_response())
}

#[instrument(skip(state, staff), fields(user_id = %staff.id, vacancy_id = %id))]
pub async fn delete_vacancy(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(id): Path<VacancyId>,
) -> Result<Redirect> {
    ContentRepository::new(state.pool())
        .delete_vacancy(id)
        .await?;
    tracing::info!("Vacancy deleted");
    Ok(redirect_with("/admin/vacancies", "success", "Vacancy deleted"))
}

// =============================================================================
// Statistics
// =============================================================================

/// Sales, customer and genre statistics.
#[instrument(skip(state, staff), fields(user_id = %staff.id))]
pub async fn statistics(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Query(query): Query<DateRangeQuery>,
) -> Result<impl IntoResponse> {
    let today = today();
    let range = query.resolve().map_err(AppError::BadRequest)?;

    let stats = StatsRepository::new(state.pool());
    Ok(StatisticsTemplate {
        current_user: Some(staff),
        overview: stats.overview(range, today.year()).await?,
        report: stats.report(today, range).await?,
        snapshots: stats.snapshots(None, SNAPSHOT_ROWS).await?,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use chrono::NaiveDate;

    #[test]
    fn test_range_defaults_to_all_time() {
        let range = DateRangeQuery::default().resolve().unwrap();
        assert_eq!(range, DateRange::default());
    }

    #[test]
    fn test_range_ignores_unparsable_dates() {
        let query = DateRangeQuery {
            start_date: Some("yesterday".to_owned()),
            end_date: Some("2026-10-19".to_owned()),
        };
        let range = query.resolve().unwrap();
        assert_eq!(range.start, None);
        assert_eq!(range.end, NaiveDate::from_ymd_opt(2026, 10, 19));
    }

    #[test]
    fn test_range_rejects_reversed_dates() {
        let reversed = DateRangeQuery {
            start_date: Some("2026-05-01".to_owned()),
            end_date: Some("2026-04-01".to_owned()),
        };
        assert!(reversed.resolve().is_err());
    }

    #[test]
    fn test_vacancy_form_round_trips_active_flag() {
        let vacancy = Vacancy {
            id: VacancyId::new(1),
            title: "Bookseller".to_owned(),
            description: "Help readers".to_owned(),
            requirements: String::new(),
            salary: "1500 BYN".to_owned(),
            is_active: true,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        assert!(vacancy_form(&vacancy).active());
    }
}
