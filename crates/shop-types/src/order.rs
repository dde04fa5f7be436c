//! Order records and the order status enumeration.
//!
//! An order is created by a validated checkout and then moves through the
//! lifecycle states declared here. Which moves are legal is decided by the
//! transition table in [`crate::workflow`], never by the order itself.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{DeliveryType, LineItem, PaymentMethod, ValidatedCheckout};

/// Lifecycle state of an order.
///
/// Variants are declared in lifecycle order and serialize as stable
/// SCREAMING_SNAKE_CASE identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
	/// Order has been placed and awaits confirmation by the shop.
	Pending,
	/// Shop accepted the order.
	Confirmed,
	/// Order is being packed.
	Processing,
	/// Order left with a courier.
	Shipped,
	/// Order reached the customer.
	Delivered,
	/// Order was cancelled before completion.
	Cancelled,
}

impl OrderStatus {
	/// Every status, in lifecycle order.
	pub const ALL: [OrderStatus; 6] = [
		OrderStatus::Pending,
		OrderStatus::Confirmed,
		OrderStatus::Processing,
		OrderStatus::Shipped,
		OrderStatus::Delivered,
		OrderStatus::Cancelled,
	];

	/// Returns the wire identifier of the status.
	pub fn as_str(&self) -> &'static str {
		match self {
			OrderStatus::Pending => "PENDING",
			OrderStatus::Confirmed => "CONFIRMED",
			OrderStatus::Processing => "PROCESSING",
			OrderStatus::Shipped => "SHIPPED",
			OrderStatus::Delivered => "DELIVERED",
			OrderStatus::Cancelled => "CANCELLED",
		}
	}

	/// Returns the human-readable label shown in the storefront and admin.
	pub fn label(&self) -> &'static str {
		match self {
			OrderStatus::Pending => "Pending",
			OrderStatus::Confirmed => "Confirmed",
			OrderStatus::Processing => "Processing",
			OrderStatus::Shipped => "Shipped",
			OrderStatus::Delivered => "Delivered",
			OrderStatus::Cancelled => "Cancelled",
		}
	}
}

impl fmt::Display for OrderStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for OrderStatus {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		OrderStatus::ALL
			.into_iter()
			.find(|status| status.as_str() == s)
			.ok_or_else(|| format!("Unknown order status: {}", s))
	}
}

/// One accepted status change, appended to the order history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
	pub from: OrderStatus,
	pub to: OrderStatus,
	/// Unix seconds at which the change was persisted.
	pub at: u64,
}

/// A placed storefront order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
	/// Unique identifier for this order.
	pub id: String,
	/// Timestamp when this order was created.
	pub created_at: u64,
	/// Timestamp when this order was last updated.
	pub updated_at: u64,
	/// Current status of the order.
	pub status: OrderStatus,
	/// Name the order was placed under.
	pub customer_name: String,
	/// Contact phone, already validated against the local format.
	pub phone: String,
	/// How the order reaches the customer.
	pub delivery_type: DeliveryType,
	/// Saved address reference; only present for home delivery.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub address_id: Option<String>,
	pub payment_method: PaymentMethod,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub notes: Option<String>,
	#[serde(default)]
	pub is_gift: bool,
	/// Requested delivery or pickup date.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub delivery_date: Option<chrono::NaiveDate>,
	pub items: Vec<LineItem>,
	/// Sum of `quantity * unit_price` over all items.
	pub total: Decimal,
	/// Accepted status changes, oldest first.
	#[serde(default)]
	pub history: Vec<StatusChange>,
}

impl Order {
	/// A new order in the initial status.
	pub fn place(id: String, checkout: ValidatedCheckout, now: u64) -> Self {
		Self {
			id,
			created_at: now,
			updated_at: now,
			status: OrderStatus::Pending,
			customer_name: checkout.name,
			phone: checkout.phone,
			delivery_type: checkout.delivery_type,
			address_id: checkout.address_id,
			payment_method: checkout.payment_method,
			notes: checkout.notes,
			is_gift: checkout.is_gift,
			delivery_date: checkout.delivery_date,
			items: checkout.items,
			total: checkout.total,
			history: Vec::new(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_status_round_trips_through_wire_identifier() {
		for status in OrderStatus::ALL {
			assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
			let json = serde_json::to_string(&status).unwrap();
			assert_eq!(json, format!("\"{}\"", status.as_str()));
		}
	}

	#[test]
	fn test_unknown_status_is_rejected() {
		assert!("REFUNDED".parse::<OrderStatus>().is_err());
		assert!("pending".parse::<OrderStatus>().is_err());
	}

	#[test]
	fn test_all_is_in_lifecycle_order() {
		let mut sorted = OrderStatus::ALL;
		sorted.sort();
		assert_eq!(sorted, OrderStatus::ALL);
		assert_eq!(OrderStatus::ALL.first(), Some(&OrderStatus::Pending));
	}
}
