//! The caller's own account and customer profile.

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;
use tracing::instrument;

use heavyshop_core::Email;

use crate::db::{CustomerRepository, UserRepository};
use crate::error::{ApiResult, AppError};
use crate::middleware::RequireAuth;
use crate::models::{Customer, CustomerProfileInput, User};
use crate::routes::api::{ApiJson, invalid};
use crate::routes::today;
use crate::state::AppState;

/// Build the customer router.
pub fn router() -> Router<AppState> {
    Router::new().route("/customer", get(show).put(update))
}

/// Account details with the customer profile, if one exists.
#[derive(Debug, Serialize)]
pub struct CustomerResponse {
    pub username: String,
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    pub is_staff: bool,
    pub customer: Option<Customer>,
    pub age: Option<u32>,
}

impl CustomerResponse {
    fn new(user: User, customer: Option<Customer>) -> Self {
        let age = customer.as_ref().and_then(|c| c.age_on(today()));
        Self {
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            is_staff: user.is_staff,
            customer,
            age,
        }
    }
}

async fn load(state: &AppState, user_id: heavyshop_core::UserId) -> ApiResult<User> {
    Ok(UserRepository::new(state.pool())
        .get_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {user_id}")))?)
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> ApiResult<Json<CustomerResponse>> {
    let account = load(&state, user.id).await?;
    let customer = CustomerRepository::new(state.pool())
        .get_by_user(user.id)
        .await?;
    Ok(Json(CustomerResponse::new(account, customer)))
}

/// Create or replace the caller's customer profile.
#[instrument(skip(state, user, body), fields(user_id = %user.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(body): ApiJson<CustomerProfileInput>,
) -> ApiResult<Json<CustomerResponse>> {
    let profile = body.validate(today()).map_err(invalid)?;
    let customer = CustomerRepository::new(state.pool())
        .upsert(user.id, &profile)
        .await?;
    tracing::info!(customer_id = %customer.id, "Profile saved");
    let account = load(&state, user.id).await?;
    Ok(Json(CustomerResponse::new(account, Some(customer))))
}
