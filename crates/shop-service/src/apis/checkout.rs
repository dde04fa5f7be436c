//! Checkout endpoint.

use super::{checkout_error, invalid_body};
use crate::server::AppState;
use axum::{
	extract::{rejection::JsonRejection, State},
	http::StatusCode,
	response::Json,
};
use shop_types::{APIError, CheckoutRequest, OrderResponse};

/// Handles POST /api/checkout.
///
/// Responds with 201 and the stored order. Rule violations are answered
/// with 422 and nothing is stored.
pub async fn place_order(
	State(state): State<AppState>,
	payload: Result<Json<CheckoutRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<OrderResponse>), APIError> {
	let Json(request) = payload.map_err(invalid_body)?;

	let order = state
		.engine
		.checkout()
		.place_order(request)
		.await
		.map_err(checkout_error)?;

	Ok((StatusCode::CREATED, Json(order.into())))
}
