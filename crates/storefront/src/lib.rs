//! HeavyShop storefront library.
//!
//! The bookstore server as a library: pages, JSON API, staff pages and
//! database access. The binary in `main.rs` only loads configuration,
//! sets up tracing and serves [`app`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    middleware::from_fn,
    routing::get,
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::state::AppState;

/// Build the full application router.
pub fn app(state: AppState) -> Router {
    let session_layer = middleware::create_session_layer(state.pool(), state.config());
    let static_dir = state.config().static_dir.clone();
    let media_dir = state.config().media_dir.clone();

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes())
        .nest_service("/static", ServeDir::new(static_dir))
        .nest_service("/media", ServeDir::new(media_dir))
        .layer(session_layer)
        .layer(from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// Liveness check. Does not touch the database.
async fn health() -> &'static str {
    "ok"
}

/// Readiness check: 503 when the database is unreachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{body::Body, http::Request};
    use secrecy::SecretString;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use super::*;
    use crate::config::{StorefrontConfig, WidgetConfig};

    fn test_app() -> Router {
        let config = StorefrontConfig {
            database_url: SecretString::from("postgres://localhost/heavyshop_test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_owned(),
            session_secret: SecretString::from("x7Kp2mQ9vR4tW8yB3nF6hJ1cL5gD0sZa"),
            media_dir: "media".into(),
            static_dir: "static".into(),
            widgets: WidgetConfig {
                enabled: false,
                ..WidgetConfig::default()
            },
            sentry_dsn: None,
            sentry_environment: None,
            currency: "BYN".to_owned(),
        };
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/heavyshop_test")
            .unwrap();
        app(AppState::new(config, pool).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let response = test_app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_admin_api_rejects_anonymous() {
        let request = Request::get("/api/statistics")
            .header("x-forwarded-for", "203.0.113.9")
            .body(Body::empty())
            .unwrap();
        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
