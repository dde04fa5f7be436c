//! Admin endpoints for the order workflow.

use super::{invalid_body, order_error};
use crate::server::AppState;
use axum::{
	extract::{rejection::JsonRejection, Path, State},
	response::Json,
};
use shop_types::{
	admin::status_options, APIError, OrderResponse, StatusOptionsResponse, UpdateStatusRequest,
};

/// Handles GET /api/admin/statuses.
pub async fn statuses() -> Json<StatusOptionsResponse> {
	Json(StatusOptionsResponse {
		statuses: status_options(),
	})
}

/// Handles PATCH /api/admin/orders/{id}/status.
pub async fn update_status(
	State(state): State<AppState>,
	Path(id): Path<String>,
	payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<Json<OrderResponse>, APIError> {
	let Json(request) = payload.map_err(invalid_body)?;

	let order = state
		.engine
		.orders()
		.update_status(&id, request.status)
		.await
		.map_err(order_error)?;
	Ok(Json(order.into()))
}
