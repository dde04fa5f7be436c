//! Workflow error taxonomy.
//!
//! Every rule of the order workflow fails with one of these variants. They
//! are returned as values before anything is persisted, and each carries a
//! stable machine code through [`WorkflowError::code`].

use thiserror::Error;

use crate::{CheckoutField, DeliveryType, OrderStatus, PaymentMethod};

/// A rejected workflow operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
	/// The `(from, to)` pair is not in the transition table.
	#[error("Invalid status transition from {from} to {to}")]
	InvalidTransition { from: OrderStatus, to: OrderStatus },
	/// The pair is in the table but not allowed for this delivery type.
	#[error("Transition from {from} to {to} is not permitted for {delivery} orders")]
	TransitionNotPermittedForDelivery {
		from: OrderStatus,
		to: OrderStatus,
		delivery: DeliveryType,
	},
	/// The method is modeled but not offered to customers.
	#[error("Payment method {0} is not available")]
	UnavailablePaymentMethod(PaymentMethod),
	/// The phone number does not match the local format.
	#[error("Malformed phone number: expected {expected}")]
	MalformedPhoneNumber { expected: &'static str },
	/// A field required by the selected delivery type is absent.
	#[error("Missing required field: {0}")]
	MissingRequiredField(CheckoutField),
	/// A field failed schema validation.
	#[error("Invalid value for field '{field}': {message}")]
	InvalidField { field: String, message: String },
}

impl WorkflowError {
	/// Stable identifier of the rule that failed.
	pub fn code(&self) -> &'static str {
		match self {
			WorkflowError::InvalidTransition { .. } => "INVALID_TRANSITION",
			WorkflowError::TransitionNotPermittedForDelivery { .. } => {
				"TRANSITION_NOT_PERMITTED_FOR_DELIVERY"
			},
			WorkflowError::UnavailablePaymentMethod(_) => "UNAVAILABLE_PAYMENT_METHOD",
			WorkflowError::MalformedPhoneNumber { .. } => "MALFORMED_PHONE_NUMBER",
			WorkflowError::MissingRequiredField(_) => "MISSING_REQUIRED_FIELD",
			WorkflowError::InvalidField { .. } => "INVALID_FIELD",
		}
	}

	/// Structured detail for API responses.
	pub fn details(&self) -> serde_json::Value {
		match self {
			WorkflowError::InvalidTransition { from, to } => {
				serde_json::json!({ "from": from, "to": to })
			},
			WorkflowError::TransitionNotPermittedForDelivery { from, to, delivery } => {
				serde_json::json!({ "from": from, "to": to, "deliveryType": delivery })
			},
			WorkflowError::UnavailablePaymentMethod(method) => {
				serde_json::json!({ "paymentMethod": method })
			},
			WorkflowError::MalformedPhoneNumber { expected } => {
				serde_json::json!({ "field": "phone", "expected": expected })
			},
			WorkflowError::MissingRequiredField(field) => {
				serde_json::json!({ "field": field.as_str() })
			},
			WorkflowError::InvalidField { field, .. } => serde_json::json!({ "field": field }),
		}
	}
}
