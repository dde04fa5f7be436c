//! Checkout submission parsing and validation.
//!
//! Untrusted checkout payloads deserialize into [`CheckoutRequest`], whose
//! enumerated fields are already typed by serde. [`CheckoutRequest::validate_checkout`]
//! then applies the field-level rules and returns a [`ValidatedCheckout`] that
//! the order handler can persist without further checks.

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{CheckoutField, DeliveryType, PaymentMethod, WorkflowError};

/// Human-readable description of the accepted phone format.
pub const PHONE_PATTERN: &str = "10 digits starting with 07";

// ASCII digits only; `\d` would also accept non-Latin digits.
static PHONE_RE: Lazy<Regex> =
	Lazy::new(|| Regex::new(r"^07[0-9]{8}$").expect("phone pattern compiles"));

/// Validates a phone number against the local mobile format.
pub fn validate_phone(phone: &str) -> Result<(), WorkflowError> {
	if PHONE_RE.is_match(phone) {
		Ok(())
	} else {
		Err(WorkflowError::MalformedPhoneNumber {
			expected: PHONE_PATTERN,
		})
	}
}

/// A product line in the cart at checkout time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
	pub product_id: String,
	pub name: String,
	pub quantity: u32,
	pub unit_price: Decimal,
}

impl LineItem {
	/// Price of the line.
	pub fn subtotal(&self) -> Decimal {
		self.unit_price * Decimal::from(self.quantity)
	}
}

/// Raw checkout submission.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CheckoutRequest {
	/// Absent keys deserialize as empty so the rule check reports them.
	#[serde(default)]
	#[validate(length(max = 100))]
	pub name: String,
	#[serde(default)]
	pub phone: String,
	pub delivery_type: DeliveryType,
	#[serde(default)]
	pub selected_address_id: Option<String>,
	pub payment_method: PaymentMethod,
	#[serde(default)]
	#[validate(length(max = 500))]
	pub notes: Option<String>,
	#[serde(default)]
	pub is_gift: bool,
	#[serde(default)]
	pub delivery_date: Option<chrono::NaiveDate>,
	#[validate(length(min = 1))]
	pub items: Vec<LineItem>,
}

/// A checkout that passed every rule.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedCheckout {
	pub name: String,
	pub phone: String,
	pub delivery_type: DeliveryType,
	/// Always `Some` for delivery, always `None` for pickup.
	pub address_id: Option<String>,
	pub payment_method: PaymentMethod,
	pub notes: Option<String>,
	pub is_gift: bool,
	pub delivery_date: Option<chrono::NaiveDate>,
	pub items: Vec<LineItem>,
	pub total: Decimal,
}

fn non_blank(value: Option<String>) -> Option<String> {
	value
		.map(|v| v.trim().to_string())
		.filter(|v| !v.is_empty())
}

impl CheckoutRequest {
	/// Applies the checkout rules in order: required fields, phone format,
	/// schema limits, payment allow-list, line items.
	pub fn validate_checkout(self) -> Result<ValidatedCheckout, WorkflowError> {
		let name = self.name.trim().to_string();
		if name.is_empty() {
			return Err(WorkflowError::MissingRequiredField(CheckoutField::Name));
		}
		if self.phone.is_empty() {
			return Err(WorkflowError::MissingRequiredField(CheckoutField::Phone));
		}
		validate_phone(&self.phone)?;

		let address_id = non_blank(self.selected_address_id.clone());
		if self
			.delivery_type
			.required_fields()
			.contains(&CheckoutField::SelectedAddress)
			&& address_id.is_none()
		{
			return Err(WorkflowError::MissingRequiredField(
				CheckoutField::SelectedAddress,
			));
		}

		if let Err(errors) = self.validate() {
			let mut failures: Vec<(String, String)> = errors
				.field_errors()
				.into_iter()
				.map(|(field, errs)| {
					let code = errs.first().map(|e| e.code.to_string()).unwrap_or_default();
					(field.to_string(), code)
				})
				.collect();
			failures.sort();
			if let Some((field, code)) = failures.into_iter().next() {
				return Err(WorkflowError::InvalidField {
					field,
					message: format!("failed {} check", code),
				});
			}
		}

		if !self.payment_method.is_available() {
			return Err(WorkflowError::UnavailablePaymentMethod(self.payment_method));
		}

		for item in &self.items {
			if item.quantity == 0 {
				return Err(WorkflowError::InvalidField {
					field: "items".into(),
					message: format!("quantity for product {} must be at least 1", item.product_id),
				});
			}
			if item.unit_price.is_sign_negative() {
				return Err(WorkflowError::InvalidField {
					field: "items".into(),
					message: format!("unit price for product {} cannot be negative", item.product_id),
				});
			}
		}
		let total = self.items.iter().map(LineItem::subtotal).sum();

		Ok(ValidatedCheckout {
			name,
			phone: self.phone,
			delivery_type: self.delivery_type,
			address_id: match self.delivery_type {
				DeliveryType::Delivery => address_id,
				DeliveryType::Pickup => None,
			},
			payment_method: self.payment_method,
			notes: non_blank(self.notes),
			is_gift: self.is_gift,
			delivery_date: self.delivery_date,
			items: self.items,
			total,
		})
	}
}
