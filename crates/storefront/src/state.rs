//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::services::widgets::{WidgetError, WidgetService};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    widgets: WidgetService,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the widget HTTP client cannot be built.
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Result<Self, WidgetError> {
        let widgets = WidgetService::new(config.widgets.clone())?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                widgets,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Display currency code.
    #[must_use]
    pub fn currency(&self) -> &str {
        &self.inner.config.currency
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Weather and exchange-rate widgets.
    #[must_use]
    pub fn widgets(&self) -> &WidgetService {
        &self.inner.widgets
    }
}
