//! Authentication extractors.
//!
//! The logged-in user lives in the session under `session_keys::CURRENT_USER`.
//! Page requests that fail a check are redirected to the login page; `/api/`
//! requests get a JSON error with 401 or 403.

use axum::{
    Json,
    extract::{FromRequestParts, OriginalUri},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use serde_json::json;
use tower_sessions::Session;

use crate::db::CustomerRepository;
use crate::error::ApiError;
use crate::models::{CurrentUser, Customer, session_keys};
use crate::state::AppState;

/// Extractor that requires a logged-in user.
///
/// ```rust,ignore
/// async fn cart_page(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("Cart of {}", user.username)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Extractor that requires a logged-in staff member.
pub struct RequireStaff(pub CurrentUser);

/// Extractor that optionally gets the current user.
pub struct OptionalAuth(pub Option<CurrentUser>);

/// Why an auth extractor refused the request.
#[derive(Debug, PartialEq, Eq)]
pub enum AuthRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin,
    /// 401 for API requests.
    Unauthorized,
    /// Logged in without the needed role.
    Forbidden { api: bool },
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/auth/login").into_response(),
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Authentication required" })),
            )
                .into_response(),
            Self::Forbidden { api: true } => (
                StatusCode::FORBIDDEN,
                Json(json!({ "error": "Staff access required" })),
            )
                .into_response(),
            Self::Forbidden { api: false } => {
                (StatusCode::FORBIDDEN, "Staff access required").into_response()
            }
        }
    }
}

/// Nested routers see a stripped URI, so prefer the original one.
fn is_api(parts: &Parts) -> bool {
    parts
        .extensions
        .get::<OriginalUri>()
        .map_or(&parts.uri, |original| &original.0)
        .path()
        .starts_with("/api/")
}

async fn current_user(parts: &Parts) -> Option<CurrentUser> {
    let session = parts.extensions.get::<Session>()?;
    session
        .get::<CurrentUser>(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        current_user(parts).await.map(Self).ok_or_else(|| {
            if is_api(parts) {
                AuthRejection::Unauthorized
            } else {
                AuthRejection::RedirectToLogin
            }
        })
    }
}

impl<S> FromRequestParts<S> for RequireStaff
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let RequireAuth(user) = RequireAuth::from_request_parts(parts, state).await?;
        if user.role().is_staff() {
            Ok(Self(user))
        } else {
            Err(AuthRejection::Forbidden { api: is_api(parts) })
        }
    }
}

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(current_user(parts).await))
    }
}

/// Extractor that requires a logged-in user with a customer profile.
///
/// Ordering and reviewing need a phone, address and birth date on file.
pub struct RequireCustomer {
    pub user: CurrentUser,
    pub customer: Customer,
}

/// Why [`RequireCustomer`] refused the request.
pub enum CustomerRejection {
    Auth(AuthRejection),
    /// Logged in but no profile yet.
    MissingProfile { api: bool },
    Lookup(ApiError),
}

/// Message shown when a profile is needed first.
pub const PROFILE_REQUIRED: &str = "Please complete your customer profile first";

impl IntoResponse for CustomerRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Auth(rejection) => rejection.into_response(),
            Self::MissingProfile { api: true } => (
                StatusCode::FORBIDDEN,
                Json(json!({ "error": PROFILE_REQUIRED })),
            )
                .into_response(),
            Self::MissingProfile { api: false } => {
                let message: String =
                    url::form_urlencoded::byte_serialize(PROFILE_REQUIRED.as_bytes()).collect();
                Redirect::to(&format!("/account/profile?error={message}")).into_response()
            }
            Self::Lookup(err) => err.into_response(),
        }
    }
}

impl FromRequestParts<AppState> for RequireCustomer {
    type Rejection = CustomerRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireAuth(user) = RequireAuth::from_request_parts(parts, state)
            .await
            .map_err(CustomerRejection::Auth)?;
        let customer = CustomerRepository::new(state.pool())
            .get_by_user(user.id)
            .await
            .map_err(|e| CustomerRejection::Lookup(e.into()))?
            .ok_or(CustomerRejection::MissingProfile { api: is_api(parts) })?;
        Ok(Self { user, customer })
    }
}

/// Store the logged-in user in the session.
///
/// The session ID is cycled first so a pre-login ID can't be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Clear the logged-in user (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentUser>(session_keys::CURRENT_USER)
        .await?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::Request;

    use super::*;

    fn parts(path: &str) -> Parts {
        Request::builder()
            .uri(path)
            .body(())
            .unwrap()
            .into_parts()
            .0
    }

    #[tokio::test]
    async fn test_page_without_session_redirects() {
        let mut parts = parts("/cart");
        let rejection = RequireAuth::from_request_parts(&mut parts, &())
            .await
            .err()
            .unwrap();
        assert_eq!(rejection, AuthRejection::RedirectToLogin);

        let response = rejection.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()["location"], "/auth/login");
    }

    #[tokio::test]
    async fn test_api_without_session_is_unauthorized() {
        let mut parts = parts("/api/cart");
        let rejection = RequireStaff::from_request_parts(&mut parts, &())
            .await
            .err()
            .unwrap();
        assert_eq!(rejection, AuthRejection::Unauthorized);
        assert_eq!(rejection.into_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_optional_auth_without_session() {
        let mut parts = parts("/");
        let OptionalAuth(user) = OptionalAuth::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert!(user.is_none());
    }

    #[tokio::test]
    async fn test_nested_api_route_keeps_json_rejection() {
        let mut parts = parts("/cart");
        parts
            .extensions
            .insert(OriginalUri("/api/cart".parse().unwrap()));
        let rejection = RequireAuth::from_request_parts(&mut parts, &())
            .await
            .err()
            .unwrap();
        assert_eq!(rejection, AuthRejection::Unauthorized);
    }

    #[test]
    fn test_forbidden_statuses() {
        assert_eq!(
            AuthRejection::Forbidden { api: true }.into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AuthRejection::Forbidden { api: false }.into_response().status(),
            StatusCode::FORBIDDEN
        );
    }
}
