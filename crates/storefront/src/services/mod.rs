//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Username/password accounts (Argon2id)
//! - `widgets` - Weather and exchange-rate widgets (cached HTTP calls)
//! - `calendar` - Month grid for the home page

pub mod auth;
pub mod calendar;
pub mod widgets;

pub use auth::{AuthError, AuthService};
pub use calendar::MonthGrid;
pub use widgets::{HomeWidgets, WidgetService};
