//! Unified error handling with Sentry integration.
//!
//! Page handlers return `Result<T, AppError>` and get a plain-text error page;
//! API handlers return `Result<T, ApiError>` and get `{"error": "..."}`.
//! Server errors are captured to Sentry before responding, and clients never
//! see their details.

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Input rejected by a business rule.
    #[error("{0}")]
    Validation(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Authentication required")]
    Unauthorized,

    /// User is authenticated but lacks permission.
    #[error("Permission denied")]
    Forbidden,

    /// Write would violate a uniqueness rule.
    #[error("{0}")]
    Conflict(String),

    /// Malformed request.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Database(err) => match err {
                RepositoryError::NotFound => StatusCode::NOT_FOUND,
                RepositoryError::Conflict(_) => StatusCode::CONFLICT,
                RepositoryError::Validation(_) => StatusCode::BAD_REQUEST,
                RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::UserAlreadyExists => StatusCode::CONFLICT,
                AuthError::WeakPassword(_)
                | AuthError::InvalidEmail(_)
                | AuthError::InvalidUsername(_)
                | AuthError::PasswordMismatch => StatusCode::BAD_REQUEST,
                AuthError::Repository(_) | AuthError::PasswordHash => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to the client.
    #[must_use]
    pub fn public_message(&self) -> String {
        if self.status().is_server_error() {
            return "Internal server error".to_owned();
        }
        match self {
            Self::Database(err) => match err {
                RepositoryError::NotFound => "Not found".to_owned(),
                RepositoryError::Conflict(msg) | RepositoryError::Validation(msg) => msg.clone(),
                _ => "Internal server error".to_owned(),
            },
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => "Invalid username or password".to_owned(),
                AuthError::UserAlreadyExists => {
                    "A user with that username already exists".to_owned()
                }
                AuthError::WeakPassword(msg) => msg.clone(),
                AuthError::InvalidEmail(_) => "Invalid email address".to_owned(),
                AuthError::InvalidUsername(e) => e.to_string(),
                AuthError::PasswordMismatch => "Passwords do not match".to_owned(),
                _ => "Authentication error".to_owned(),
            },
            Self::BadRequest(msg) => msg.clone(),
            _ => self.to_string(),
        }
    }

    /// Capture server errors to Sentry and the log.
    fn report(&self) {
        if self.status().is_server_error() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.report();
        (self.status(), self.public_message()).into_response()
    }
}

/// JSON flavour of [`AppError`] for `/api` handlers.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        Self(AppError::Database(err))
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        Self(AppError::Auth(err))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(AppError::BadRequest(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(AppError::BadRequest(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.0.report();
        (
            self.0.status(),
            Json(json!({ "error": self.0.public_message() })),
        )
            .into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Result type alias for `ApiError`.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Set the Sentry user context.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, username: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            username: username.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added book to cart", Some(&[("book_id", "12")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_owned()),
        message: Some(message.to_owned()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_owned(),
                serde_json::Value::String((*value).to_owned()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("book 12".to_owned());
        assert_eq!(err.to_string(), "Not found: book 12");

        let err = AppError::Validation("Comment cannot be empty".to_owned());
        assert_eq!(err.public_message(), "Comment cannot be empty");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("x".to_owned())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(get_status(AppError::Unauthorized), StatusCode::UNAUTHORIZED);
        assert_eq!(get_status(AppError::Forbidden), StatusCode::FORBIDDEN);
        assert_eq!(
            get_status(AppError::Conflict("x".to_owned())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Validation("x".to_owned())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("x".to_owned())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_repository_errors_map_to_client_statuses() {
        assert_eq!(
            get_status(RepositoryError::NotFound.into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(RepositoryError::Conflict("You have already reviewed this book".to_owned()).into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(RepositoryError::Validation("Book is out of stock".to_owned()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(RepositoryError::DataCorruption("bad row".to_owned()).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let err = AppError::Internal("connection string leaked".to_owned());
        assert_eq!(err.public_message(), "Internal server error");
    }

    #[tokio::test]
    async fn test_api_error_is_json() {
        let response =
            ApiError::from(RepositoryError::Validation("Book is out of stock".to_owned()))
                .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["error"], "Book is out of stock");
    }
}
