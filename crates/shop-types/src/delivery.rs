//! Delivery types and the checkout fields each one requires.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// How an order reaches the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryType {
	/// Courier delivery to a saved address.
	Delivery,
	/// Customer collects the order from the shop.
	Pickup,
}

/// Fields of a checkout submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutField {
	Name,
	Phone,
	SelectedAddress,
	Notes,
	IsGift,
	DeliveryDate,
}

impl CheckoutField {
	/// Returns the field name as it appears in checkout payloads.
	pub fn as_str(&self) -> &'static str {
		match self {
			CheckoutField::Name => "name",
			CheckoutField::Phone => "phone",
			CheckoutField::SelectedAddress => "selected_address_id",
			CheckoutField::Notes => "notes",
			CheckoutField::IsGift => "is_gift",
			CheckoutField::DeliveryDate => "delivery_date",
		}
	}
}

impl fmt::Display for CheckoutField {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl DeliveryType {
	/// Every delivery type.
	pub const ALL: [DeliveryType; 2] = [DeliveryType::Delivery, DeliveryType::Pickup];

	/// Returns the wire identifier of the delivery type.
	pub fn as_str(&self) -> &'static str {
		match self {
			DeliveryType::Delivery => "DELIVERY",
			DeliveryType::Pickup => "PICKUP",
		}
	}

	/// Returns the human-readable label for display.
	pub fn label(&self) -> &'static str {
		match self {
			DeliveryType::Delivery => "Home delivery",
			DeliveryType::Pickup => "Store pickup",
		}
	}

	/// Fields a checkout with this delivery type must carry.
	pub fn required_fields(&self) -> BTreeSet<CheckoutField> {
		let mut fields = BTreeSet::from([CheckoutField::Name, CheckoutField::Phone]);
		if *self == DeliveryType::Delivery {
			fields.insert(CheckoutField::SelectedAddress);
		}
		fields
	}

	/// Fields a checkout with this delivery type may carry.
	pub fn optional_fields(&self) -> BTreeSet<CheckoutField> {
		BTreeSet::from([
			CheckoutField::Notes,
			CheckoutField::IsGift,
			CheckoutField::DeliveryDate,
		])
	}
}

/// Returns the fields required for `delivery`.
pub fn required_fields_for(delivery: DeliveryType) -> BTreeSet<CheckoutField> {
	delivery.required_fields()
}

/// Returns the optional fields accepted for `delivery`.
pub fn optional_fields_for(delivery: DeliveryType) -> BTreeSet<CheckoutField> {
	delivery.optional_fields()
}

impl fmt::Display for DeliveryType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for DeliveryType {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		DeliveryType::ALL
			.into_iter()
			.find(|delivery| delivery.as_str() == s)
			.ok_or_else(|| format!("Unknown delivery type: {}", s))
	}
}
