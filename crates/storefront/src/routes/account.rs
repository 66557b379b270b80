//! Account route handlers: the user's names, email and customer profile.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::instrument;

use heavyshop_core::Email;

use crate::db::{CustomerRepository, UserRepository};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::{CurrentUser, CustomerProfileInput};
use crate::routes::{MessageQuery, redirect_with, today};
use crate::state::AppState;

/// Profile form data. Every field arrives as text.
#[derive(Debug, Default, Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub birth_date: String,
    #[serde(default)]
    pub timezone: String,
}

impl ProfileForm {
    /// Split into a validated email and customer profile.
    fn parse(
        &self,
        today: NaiveDate,
    ) -> std::result::Result<(Email, CustomerProfileInput), String> {
        let email = Email::parse(&self.email).map_err(|e| e.to_string())?;
        let birth_date = NaiveDate::parse_from_str(self.birth_date.trim(), "%Y-%m-%d")
            .map_err(|_| "Enter your birth date as YYYY-MM-DD".to_owned())?;
        let profile = CustomerProfileInput {
            phone: self.phone.clone(),
            address: self.address.clone(),
            birth_date,
            timezone: self.timezone.clone(),
        }
        .validate(today)?;
        Ok((email, profile))
    }
}

/// Profile page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/profile.html")]
pub struct ProfileTemplate {
    pub current_user: Option<CurrentUser>,
    pub username: String,
    pub form: ProfileForm,
    pub has_profile: bool,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Display the profile form.
#[instrument(skip(state, user, query), fields(user_id = %user.id))]
pub async fn profile_page(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<MessageQuery>,
) -> Result<impl IntoResponse> {
    let account = UserRepository::new(state.pool())
        .get_by_id(user.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {}", user.id)))?;
    let customer = CustomerRepository::new(state.pool())
        .get_by_user(user.id)
        .await?;

    let mut form = ProfileForm {
        first_name: account.first_name,
        last_name: account.last_name,
        email: account.email.into_inner(),
        timezone: "Europe/Minsk".to_owned(),
        ..ProfileForm::default()
    };
    if let Some(customer) = &customer {
        form.phone.clone_from(&customer.phone);
        form.address.clone_from(&customer.address);
        form.birth_date = customer.birth_date.format("%Y-%m-%d").to_string();
        form.timezone.clone_from(&customer.timezone);
    }

    Ok(ProfileTemplate {
        username: account.username,
        current_user: Some(user),
        form,
        has_profile: customer.is_some(),
        error: query.error,
        success: query.success,
    })
}

/// Save the profile form.
#[instrument(skip(state, user, form), fields(user_id = %user.id))]
pub async fn update_profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<ProfileForm>,
) -> Result<Response> {
    let (email, profile) = match form.parse(today()) {
        Ok(parsed) => parsed,
        Err(message) => {
            let has_profile = CustomerRepository::new(state.pool())
                .get_by_user(user.id)
                .await?
                .is_some();
            return Ok(ProfileTemplate {
                username: user.username.clone(),
                current_user: Some(user),
                form,
                has_profile,
                error: Some(message),
                success: None,
            }
            .into_response());
        }
    };

    UserRepository::new(state.pool())
        .update_profile(user.id, form.first_name.trim(), form.last_name.trim(), &email)
        .await?;
    let customer = CustomerRepository::new(state.pool())
        .upsert(user.id, &profile)
        .await?;
    tracing::info!(customer_id = %customer.id, "Profile saved");

    Ok(redirect_with("/account/profile", "success", "Profile saved").into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form() -> ProfileForm {
        ProfileForm {
            first_name: "Anna".to_owned(),
            last_name: "Ivanova".to_owned(),
            email: "anna@heavyshop.by".to_owned(),
            phone: "+375 (29) 123-45-67".to_owned(),
            address: "Minsk".to_owned(),
            birth_date: "1990-04-12".to_owned(),
            timezone: "Europe/Minsk".to_owned(),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[test]
    fn test_valid_form() {
        let (email, profile) = form().parse(today()).unwrap();
        assert_eq!(email.as_str(), "anna@heavyshop.by");
        assert_eq!(profile.birth_date, NaiveDate::from_ymd_opt(1990, 4, 12).unwrap());
    }

    #[test]
    fn test_bad_birth_date() {
        let mut form = form();
        form.birth_date = "12/04/1990".to_owned();
        assert_eq!(
            form.parse(today()).unwrap_err(),
            "Enter your birth date as YYYY-MM-DD"
        );
    }

    #[test]
    fn test_bad_email() {
        let mut form = form();
        form.email = "not-an-email".to_owned();
        assert!(form.parse(today()).is_err());
    }
}
