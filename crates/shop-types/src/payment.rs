//! Payment methods.
//!
//! The shop models more methods than it offers. [`PaymentMethod::ALL`] is the
//! modeled domain, [`PaymentMethod::AVAILABLE`] is the allow-list exposed to
//! customers at checkout. VISA is modeled but not on the allow-list.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Payment method selected at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
	/// Card payment.
	Visa,
	/// Cash handed to the courier or at the counter.
	CashOnDelivery,
	/// Instant bank transfer through CliQ.
	Cliq,
}

impl PaymentMethod {
	/// Every modeled payment method.
	pub const ALL: [PaymentMethod; 3] = [
		PaymentMethod::Visa,
		PaymentMethod::CashOnDelivery,
		PaymentMethod::Cliq,
	];

	/// Methods currently offered to customers.
	pub const AVAILABLE: [PaymentMethod; 2] = [PaymentMethod::CashOnDelivery, PaymentMethod::Cliq];

	/// Returns the wire identifier of the method.
	pub fn as_str(&self) -> &'static str {
		match self {
			PaymentMethod::Visa => "VISA",
			PaymentMethod::CashOnDelivery => "CASH_ON_DELIVERY",
			PaymentMethod::Cliq => "CLIQ",
		}
	}

	/// Returns the human-readable label for display.
	pub fn label(&self) -> &'static str {
		match self {
			PaymentMethod::Visa => "Visa",
			PaymentMethod::CashOnDelivery => "Cash on delivery",
			PaymentMethod::Cliq => "CliQ",
		}
	}

	/// Whether customers may currently pick this method.
	pub fn is_available(&self) -> bool {
		Self::AVAILABLE.contains(self)
	}
}

/// Returns true iff `method` is on the customer-facing allow-list.
pub fn is_available_payment_method(method: PaymentMethod) -> bool {
	method.is_available()
}

impl fmt::Display for PaymentMethod {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for PaymentMethod {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		PaymentMethod::ALL
			.into_iter()
			.find(|method| method.as_str() == s)
			.ok_or_else(|| format!("Unknown payment method: {}", s))
	}
}
