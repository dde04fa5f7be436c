//! Customer-facing order endpoints.
//!
//! Order detail, the order history of a phone number, and cancellation. A
//! cancellation goes through the same transition check as an admin update.

use super::order_error;
use crate::server::AppState;
use axum::{
	extract::{Path, State},
	response::Json,
};
use shop_types::{APIError, CustomerOrdersResponse, OrderResponse};

/// Handles GET /api/orders/{id}.
pub async fn get_order(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<Json<OrderResponse>, APIError> {
	let order = state
		.engine
		.orders()
		.get_order(&id)
		.await
		.map_err(order_error)?;
	Ok(Json(order.into()))
}

/// Handles GET /api/customers/{phone}/orders.
pub async fn customer_orders(
	State(state): State<AppState>,
	Path(phone): Path<String>,
) -> Result<Json<CustomerOrdersResponse>, APIError> {
	let orders = state
		.engine
		.orders()
		.customer_orders(&phone)
		.await
		.map_err(order_error)?;

	Ok(Json(CustomerOrdersResponse {
		phone,
		orders: orders.into_iter().map(OrderResponse::from).collect(),
	}))
}

/// Handles POST /api/orders/{id}/cancel.
pub async fn cancel_order(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<Json<OrderResponse>, APIError> {
	let order = state
		.engine
		.orders()
		.cancel(&id)
		.await
		.map_err(order_error)?;
	Ok(Json(order.into()))
}
