//! Checkout and order history route handlers.
//!
//! Checkout is a simulation: placing an order reserves stock and records the
//! prices, no payment is taken.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::instrument;

use heavyshop_core::catalog::Page;
use heavyshop_core::{OrderId, PickupPointId};

use crate::db::{CartRepository, ContentRepository, OrderRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireCustomer;
use crate::models::{
    CartView, CheckoutRequest, CurrentUser, OrderDetail, OrderSummary, PickupPoint,
};
use crate::routes::{MessageQuery, PageParams, redirect_with, today};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Checkout form data. Empty inputs arrive as empty strings.
#[derive(Debug, Default, Deserialize)]
pub struct CheckoutForm {
    #[serde(default)]
    pub shipping_address: String,
    #[serde(default)]
    pub delivery_date: String,
    #[serde(default)]
    pub pickup_point_id: String,
    #[serde(default)]
    pub promo_code: String,
}

impl CheckoutForm {
    /// Convert raw form strings into a checkout request.
    fn parse(&self) -> std::result::Result<CheckoutRequest, String> {
        let delivery_date = match self.delivery_date.trim() {
            "" => None,
            raw => Some(
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .map_err(|_| "Invalid delivery date".to_owned())?,
            ),
        };
        let pickup_point_id = match self.pickup_point_id.trim() {
            "" => None,
            raw => Some(PickupPointId::new(
                raw.parse()
                    .map_err(|_| "Invalid pickup point".to_owned())?,
            )),
        };
        Ok(CheckoutRequest {
            shipping_address: self.shipping_address.clone(),
            delivery_date,
            pickup_point_id,
            promo_code: Some(self.promo_code.clone()),
        })
    }
}

// =============================================================================
// Templates
// =============================================================================

/// A pickup point in the checkout select.
pub struct PickupOption {
    pub point: PickupPoint,
    pub selected: bool,
}

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/checkout.html")]
pub struct CheckoutTemplate {
    pub current_user: Option<CurrentUser>,
    pub cart: CartView,
    pub pickup_points: Vec<PickupOption>,
    pub form: CheckoutForm,
    pub min_date: String,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Order history template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/index.html")]
pub struct OrderListTemplate {
    pub current_user: Option<CurrentUser>,
    pub orders: Page<OrderSummary>,
}

/// Order detail template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/show.html")]
pub struct OrderDetailTemplate {
    pub current_user: Option<CurrentUser>,
    pub detail: OrderDetail,
    pub success: Option<String>,
}

async fn render_checkout(
    state: &AppState,
    user: CurrentUser,
    form: CheckoutForm,
    error: Option<String>,
) -> Result<Response> {
    let cart = CartRepository::new(state.pool()).view(user.id).await?;
    let chosen = form.pickup_point_id.trim();
    let pickup_points = ContentRepository::new(state.pool())
        .pickup_points()
        .await?
        .into_iter()
        .map(|point| PickupOption {
            selected: point.id.to_string() == chosen,
            point,
        })
        .collect();
    Ok(CheckoutTemplate {
        current_user: Some(user),
        cart,
        pickup_points,
        form,
        min_date: today().format("%Y-%m-%d").to_string(),
        error,
        success: None,
    }
    .into_response())
}

// =============================================================================
// Routes
// =============================================================================

/// Display the checkout form, prefilled with the customer's address.
#[instrument(skip(state, auth, query), fields(customer_id = %auth.customer.id))]
pub async fn checkout_page(
    State(state): State<AppState>,
    auth: RequireCustomer,
    Query(query): Query<MessageQuery>,
) -> Result<Response> {
    let form = CheckoutForm {
        shipping_address: auth.customer.address.clone(),
        ..CheckoutForm::default()
    };
    render_checkout(&state, auth.user, form, query.error).await
}

/// Place the order.
#[instrument(skip(state, auth, form), fields(customer_id = %auth.customer.id))]
pub async fn checkout(
    State(state): State<AppState>,
    auth: RequireCustomer,
    Form(form): Form<CheckoutForm>,
) -> Result<Response> {
    let today = today();
    let request = match form.parse().and_then(|r| r.validate(today)) {
        Ok(request) => request,
        Err(message) => return render_checkout(&state, auth.user, form, Some(message)).await,
    };

    match OrderRepository::new(state.pool())
        .place(auth.user.id, auth.customer.id, &request, today)
        .await
    {
        Ok(detail) => {
            tracing::info!(order_id = %detail.order.id, total = %detail.total, "Order placed");
            Ok(redirect_with(
                &format!("/orders/{}", detail.order.id),
                "success",
                "Thank you! Your order has been placed.",
            )
            .into_response())
        }
        Err(RepositoryError::Validation(message)) => {
            render_checkout(&state, auth.user, form, Some(message)).await
        }
        Err(e) => Err(e.into()),
    }
}

/// Display the customer's orders.
#[instrument(skip(state, auth), fields(customer_id = %auth.customer.id))]
pub async fn index(
    State(state): State<AppState>,
    auth: RequireCustomer,
    Query(params): Query<PageParams>,
) -> Result<impl IntoResponse> {
    let orders = OrderRepository::new(state.pool())
        .list_for_customer(auth.customer.id, params.request())
        .await?;
    Ok(OrderListTemplate {
        current_user: Some(auth.user),
        orders,
    })
}

/// Display one of the customer's orders.
#[instrument(skip(state, auth, query), fields(customer_id = %auth.customer.id, order_id = %id))]
pub async fn show(
    State(state): State<AppState>,
    auth: RequireCustomer,
    Path(id): Path<OrderId>,
    Query(query): Query<MessageQuery>,
) -> Result<impl IntoResponse> {
    let detail = OrderRepository::new(state.pool())
        .get_for_customer(auth.customer.id, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;
    Ok(OrderDetailTemplate {
        current_user: Some(auth.user),
        detail,
        success: query.success,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_optional_inputs() {
        let form = CheckoutForm {
            shipping_address: "Minsk, Lenina 1".to_owned(),
            ..CheckoutForm::default()
        };
        let request = form.parse().unwrap();
        assert!(request.delivery_date.is_none());
        assert!(request.pickup_point_id.is_none());
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        assert!(request.validate(today).unwrap().promo_code.is_none());
    }

    #[test]
    fn test_parses_date_and_pickup_point() {
        let form = CheckoutForm {
            delivery_date: "2026-11-02".to_owned(),
            pickup_point_id: "3".to_owned(),
            promo_code: "books10".to_owned(),
            ..CheckoutForm::default()
        };
        let request = form.parse().unwrap();
        assert_eq!(request.delivery_date, NaiveDate::from_ymd_opt(2026, 11, 2));
        assert_eq!(request.pickup_point_id, Some(PickupPointId::new(3)));
    }

    #[test]
    fn test_rejects_garbage_date() {
        let form = CheckoutForm {
            shipping_address: "Minsk".to_owned(),
            delivery_date: "next tuesday".to_owned(),
            ..CheckoutForm::default()
        };
        assert_eq!(form.parse().unwrap_err(), "Invalid delivery date");
    }
}
