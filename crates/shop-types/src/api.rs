//! API types for the storefront HTTP API.
//!
//! This module defines the request and response bodies of the `/api`
//! endpoints and the structured error type every handler returns.

use axum::{
	http::StatusCode,
	response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::admin::StatusOption;
use crate::{
	next_statuses_for, CheckoutField, DeliveryType, Order, OrderStatus, PaymentMethod,
	WorkflowError,
};

/// A labelled enumeration value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionEntry<T> {
	pub value: T,
	pub label: String,
}

impl OptionEntry<OrderStatus> {
	pub fn status(status: OrderStatus) -> Self {
		Self {
			value: status,
			label: status.label().to_string(),
		}
	}
}

impl OptionEntry<PaymentMethod> {
	pub fn payment(method: PaymentMethod) -> Self {
		Self {
			value: method,
			label: method.label().to_string(),
		}
	}
}

/// A delivery type with the checkout fields it requires.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryOption {
	pub value: DeliveryType,
	pub label: String,
	#[serde(rename = "requiredFields")]
	pub required_fields: Vec<CheckoutField>,
	#[serde(rename = "optionalFields")]
	pub optional_fields: Vec<CheckoutField>,
}

/// Response of `GET /api/catalog/options`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogOptionsResponse {
	pub statuses: Vec<OptionEntry<OrderStatus>>,
	#[serde(rename = "paymentMethods")]
	pub payment_methods: Vec<OptionEntry<PaymentMethod>>,
	#[serde(rename = "availablePaymentMethods")]
	pub available_payment_methods: Vec<OptionEntry<PaymentMethod>>,
	#[serde(rename = "deliveryTypes")]
	pub delivery_types: Vec<DeliveryOption>,
}

impl CatalogOptionsResponse {
	/// Builds the option lists from the static enumerations.
	pub fn current() -> Self {
		Self {
			statuses: OrderStatus::ALL.into_iter().map(OptionEntry::status).collect(),
			payment_methods: PaymentMethod::ALL
				.into_iter()
				.map(OptionEntry::payment)
				.collect(),
			available_payment_methods: PaymentMethod::AVAILABLE
				.into_iter()
				.map(OptionEntry::payment)
				.collect(),
			delivery_types: DeliveryType::ALL
				.into_iter()
				.map(|delivery| DeliveryOption {
					value: delivery,
					label: delivery.label().to_string(),
					required_fields: delivery.required_fields().into_iter().collect(),
					optional_fields: delivery.optional_fields().into_iter().collect(),
				})
				.collect(),
		}
	}
}

/// Order detail returned by the order endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderResponse {
	#[serde(flatten)]
	pub order: Order,
	#[serde(rename = "statusLabel")]
	pub status_label: String,
	/// Statuses this order may move to next.
	#[serde(rename = "nextStatuses")]
	pub next_statuses: Vec<OrderStatus>,
}

impl From<Order> for OrderResponse {
	fn from(order: Order) -> Self {
		Self {
			status_label: order.status.label().to_string(),
			next_statuses: next_statuses_for(order.status, order.delivery_type),
			order,
		}
	}
}

/// Response of `GET /api/customers/{phone}/orders`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerOrdersResponse {
	pub phone: String,
	pub orders: Vec<OrderResponse>,
}

/// Body of `PATCH /api/admin/orders/{id}/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
	pub status: OrderStatus,
}

/// Response of `GET /api/admin/statuses`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusOptionsResponse {
	pub statuses: Vec<StatusOption>,
}

/// API error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
	/// Error type/code
	pub error: String,
	/// Human-readable description
	pub message: String,
	/// Additional error context
	pub details: Option<serde_json::Value>,
}

/// Structured API error type with appropriate HTTP status mapping.
#[derive(Debug)]
pub enum APIError {
	/// Malformed request (400)
	BadRequest {
		error_type: String,
		message: String,
	},
	/// Requested resource does not exist (404)
	NotFound {
		error_type: String,
		message: String,
	},
	/// Well-formed request rejected by a business rule (422)
	UnprocessableEntity {
		error_type: String,
		message: String,
		details: Option<serde_json::Value>,
	},
	/// Internal server error (500)
	InternalServerError {
		error_type: String,
		message: String,
	},
}

impl APIError {
	/// Get the HTTP status code for this error.
	pub fn status_code(&self) -> StatusCode {
		match self {
			APIError::BadRequest { .. } => StatusCode::BAD_REQUEST,
			APIError::NotFound { .. } => StatusCode::NOT_FOUND,
			APIError::UnprocessableEntity { .. } => StatusCode::UNPROCESSABLE_ENTITY,
			APIError::InternalServerError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	/// Convert to ErrorResponse for JSON serialization.
	pub fn to_error_response(&self) -> ErrorResponse {
		match self {
			APIError::BadRequest {
				error_type,
				message,
			}
			| APIError::NotFound {
				error_type,
				message,
			}
			| APIError::InternalServerError {
				error_type,
				message,
			} => ErrorResponse {
				error: error_type.clone(),
				message: message.clone(),
				details: None,
			},
			APIError::UnprocessableEntity {
				error_type,
				message,
				details,
			} => ErrorResponse {
				error: error_type.clone(),
				message: message.clone(),
				details: details.clone(),
			},
		}
	}
}

impl From<WorkflowError> for APIError {
	fn from(err: WorkflowError) -> Self {
		APIError::UnprocessableEntity {
			error_type: err.code().to_string(),
			message: err.to_string(),
			details: Some(err.details()),
		}
	}
}

impl fmt::Display for APIError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			APIError::BadRequest { message, .. } => write!(f, "Bad Request: {}", message),
			APIError::NotFound { message, .. } => write!(f, "Not Found: {}", message),
			APIError::UnprocessableEntity { message, .. } => {
				write!(f, "Unprocessable Entity: {}", message)
			},
			APIError::InternalServerError { message, .. } => {
				write!(f, "Internal Server Error: {}", message)
			},
		}
	}
}

impl std::error::Error for APIError {}

impl IntoResponse for APIError {
	fn into_response(self) -> Response {
		(self.status_code(), Json(self.to_error_response())).into_response()
	}
}
