//! Authentication route handlers.
//!
//! Username/password login and registration. A successful login stores the
//! user in the session and opens a tracked visit.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use heavyshop_core::UserRole;

use crate::error::{AppError, Result, add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{
    begin_tracked_session, clear_current_user, end_tracked_session, set_current_user,
};
use crate::models::{CurrentUser, User};
use crate::routes::MessageQuery;
use crate::services::AuthService;
use crate::services::auth::{AuthError, confirm_password};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Registration form data.
#[derive(Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub current_user: Option<CurrentUser>,
    pub username: String,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub current_user: Option<CurrentUser>,
    pub username: String,
    pub email: String,
    pub error: Option<String>,
}

/// Put a freshly authenticated user into the session.
async fn start_session(state: &AppState, session: &Session, user: &User) -> Result<()> {
    let current = CurrentUser::from(user);
    set_current_user(session, &current)
        .await
        .map_err(|e| AppError::Internal(format!("failed to store session: {e}")))?;
    begin_tracked_session(state.pool(), session, user.id).await;
    set_sentry_user(&user.id, Some(&user.username));
    add_breadcrumb("auth", "User logged in", None);
    Ok(())
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    LoginTemplate {
        current_user: None,
        username: String::new(),
        error: query.error,
        success: query.success,
    }
}

/// Handle login form submission.
#[instrument(skip(state, session, form), fields(username = %form.username))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    match AuthService::new(state.pool())
        .login(&form.username, &form.password)
        .await
    {
        Ok(user) => {
            start_session(&state, &session, &user).await?;
            tracing::info!(user_id = %user.id, "User logged in");
            Ok(Redirect::to("/").into_response())
        }
        Err(AuthError::Repository(e)) => Err(e.into()),
        Err(e) => {
            tracing::warn!(error = %e, "Login failed");
            Ok(LoginTemplate {
                current_user: None,
                username: form.username,
                error: Some(AppError::Auth(e).public_message()),
                success: None,
            }
            .into_response())
        }
    }
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    RegisterTemplate {
        current_user: None,
        username: String::new(),
        email: String::new(),
        error: query.error,
    }
}

/// Handle registration form submission. New accounts are logged in at once.
#[instrument(skip(state, session, form), fields(username = %form.username))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Result<Response> {
    let result = match confirm_password(&form.password, &form.password_confirm) {
        Ok(()) => {
            AuthService::new(state.pool())
                .register(&form.username, &form.email, &form.password, UserRole::Customer)
                .await
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(user) => {
            start_session(&state, &session, &user).await?;
            Ok(crate::routes::redirect_with(
                "/account/profile",
                "success",
                "Welcome! Fill in your profile to start ordering.",
            )
            .into_response())
        }
        Err(AuthError::Repository(e)) => Err(e.into()),
        Err(e) => Ok(RegisterTemplate {
            current_user: None,
            username: form.username,
            email: form.email,
            error: Some(AppError::Auth(e).public_message()),
        }
        .into_response()),
    }
}

// =============================================================================
// Logout
// =============================================================================

/// Log out and close the tracked visit.
#[instrument(skip(state, session))]
pub async fn logout(State(state): State<AppState>, session: Session) -> Result<Redirect> {
    end_tracked_session(state.pool(), &session).await;
    clear_current_user(&session)
        .await
        .map_err(|e| AppError::Internal(format!("failed to clear session: {e}")))?;
    clear_sentry_user();
    Ok(Redirect::to("/"))
}
