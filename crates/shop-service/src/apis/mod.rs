//! Endpoint implementations for the storefront API.
//!
//! Handler errors from `shop-core` are mapped onto [`APIError`] here so every
//! endpoint answers with the same error body.

pub mod admin;
pub mod catalog;
pub mod checkout;
pub mod order;

use axum::extract::rejection::JsonRejection;
use shop_core::{CheckoutError, OrderError};
use shop_types::APIError;

/// Maps a body that could not be parsed into the expected type.
pub(crate) fn invalid_body(rejection: JsonRejection) -> APIError {
	tracing::debug!("Rejected request body: {}", rejection.body_text());
	APIError::BadRequest {
		error_type: "INVALID_REQUEST".to_string(),
		message: rejection.body_text(),
	}
}

pub(crate) fn checkout_error(err: CheckoutError) -> APIError {
	match err {
		CheckoutError::Rejected(e) => e.into(),
		CheckoutError::State(message) => {
			tracing::error!("Checkout failed: {}", message);
			APIError::InternalServerError {
				error_type: "STORAGE_ERROR".to_string(),
				message,
			}
		},
		CheckoutError::Cache(message) => {
			tracing::error!("Checkout stored but not invalidated: {}", message);
			APIError::InternalServerError {
				error_type: "CACHE_INVALIDATION_FAILED".to_string(),
				message,
			}
		},
	}
}

pub(crate) fn order_error(err: OrderError) -> APIError {
	match err {
		OrderError::NotFound(id) => APIError::NotFound {
			error_type: "ORDER_NOT_FOUND".to_string(),
			message: format!("Order not found: {}", id),
		},
		OrderError::Rejected(e) => e.into(),
		OrderError::State(message) => {
			tracing::error!("Order operation failed: {}", message);
			APIError::InternalServerError {
				error_type: "STORAGE_ERROR".to_string(),
				message,
			}
		},
		OrderError::Cache(message) => {
			tracing::error!("Status stored but not invalidated: {}", message);
			APIError::InternalServerError {
				error_type: "CACHE_INVALIDATION_FAILED".to_string(),
				message,
			}
		},
	}
}
