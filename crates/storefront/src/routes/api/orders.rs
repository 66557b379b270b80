//! Order API for customers.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use tracing::instrument;

use heavyshop_core::OrderId;
use heavyshop_core::catalog::Page;

use crate::db::OrderRepository;
use crate::error::{ApiResult, AppError};
use crate::middleware::RequireCustomer;
use crate::models::{CheckoutRequest, OrderDetail, OrderSummary};
use crate::routes::api::{ApiJson, ApiQuery, invalid};
use crate::routes::{PageParams, today};
use crate::state::AppState;

/// Build the orders router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list).post(create))
        .route("/orders/{id}", get(show))
}

#[instrument(skip(state, auth), fields(customer_id = %auth.customer.id))]
pub async fn list(
    State(state): State<AppState>,
    auth: RequireCustomer,
    ApiQuery(params): ApiQuery<PageParams>,
) -> ApiResult<Json<Page<OrderSummary>>> {
    let orders = OrderRepository::new(state.pool())
        .list_for_customer(auth.customer.id, params.request())
        .await?;
    Ok(Json(orders))
}

/// Place an order from the current cart.
#[instrument(skip(state, auth, body), fields(customer_id = %auth.customer.id))]
pub async fn create(
    State(state): State<AppState>,
    auth: RequireCustomer,
    ApiJson(body): ApiJson<CheckoutRequest>,
) -> ApiResult<(StatusCode, Json<OrderDetail>)> {
    let today = today();
    let request = body.validate(today).map_err(invalid)?;
    let detail = OrderRepository::new(state.pool())
        .place(auth.user.id, auth.customer.id, &request, today)
        .await?;
    tracing::info!(order_id = %detail.order.id, total = %detail.total, "Order placed");
    Ok((StatusCode::CREATED, Json(detail)))
}

#[instrument(skip(state, auth), fields(customer_id = %auth.customer.id, order_id = %id))]
pub async fn show(
    State(state): State<AppState>,
    auth: RequireCustomer,
    Path(id): Path<OrderId>,
) -> ApiResult<Json<OrderDetail>> {
    let detail = OrderRepository::new(state.pool())
        .get_for_customer(auth.customer.id, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;
    Ok(Json(detail))
}
