//! Order status transition table.
//!
//! The legal state graph lives in one place: [`successors`] declares the
//! outgoing edges of every status, and [`TRANSITIONS`] is the process-wide
//! lookup built from it on first use. Customer and admin paths both query
//! this table, so they cannot disagree about which moves are legal.
//!
//! Lifecycle: Pending -> Confirmed -> Processing -> Shipped -> Delivered,
//! with Cancelled reachable until the order leaves the shop. Delivered and
//! Cancelled are terminal.

use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

use crate::{DeliveryType, OrderStatus, WorkflowError};

/// Outgoing edges of each status.
///
/// The match is exhaustive, so every status has an entry.
const fn successors(status: OrderStatus) -> &'static [OrderStatus] {
	match status {
		OrderStatus::Pending => &[OrderStatus::Confirmed, OrderStatus::Cancelled],
		OrderStatus::Confirmed => &[OrderStatus::Processing, OrderStatus::Cancelled],
		OrderStatus::Processing => &[
			OrderStatus::Shipped,
			OrderStatus::Delivered,
			OrderStatus::Cancelled,
		],
		OrderStatus::Shipped => &[OrderStatus::Delivered],
		OrderStatus::Delivered => &[], // terminal
		OrderStatus::Cancelled => &[], // terminal
	}
}

/// Static transition table - each status maps to the statuses allowed next.
static TRANSITIONS: Lazy<HashMap<OrderStatus, HashSet<OrderStatus>>> = Lazy::new(|| {
	OrderStatus::ALL
		.into_iter()
		.map(|status| (status, successors(status).iter().copied().collect()))
		.collect()
});

/// Returns the statuses directly reachable from `status`, in lifecycle order.
///
/// Terminal statuses yield an empty list.
pub fn valid_transitions(status: OrderStatus) -> Vec<OrderStatus> {
	let mut next = successors(status).to_vec();
	next.sort();
	next
}

/// Checks if `to` may directly follow `from`.
pub fn can_transition(from: OrderStatus, to: OrderStatus) -> bool {
	TRANSITIONS
		.get(&from)
		.is_some_and(|allowed| allowed.contains(&to))
}

/// Checks if no status may follow `status`.
pub fn is_terminal(status: OrderStatus) -> bool {
	TRANSITIONS
		.get(&status)
		.is_none_or(|allowed| allowed.is_empty())
}

/// Whether the delivery type allows moving into `to` from `from`.
///
/// Only narrows the table: shipping applies to courier orders, and a pickup
/// order is handed over straight from processing.
fn delivery_permits(delivery: DeliveryType, from: OrderStatus, to: OrderStatus) -> bool {
	match (delivery, from, to) {
		(DeliveryType::Pickup, _, OrderStatus::Shipped) => false,
		(DeliveryType::Delivery, OrderStatus::Processing, OrderStatus::Delivered) => false,
		_ => true,
	}
}

/// Validates a proposed status change for an order with the given delivery type.
///
/// This is the gate every persisted status mutation goes through.
pub fn check_transition(
	from: OrderStatus,
	to: OrderStatus,
	delivery: DeliveryType,
) -> Result<(), WorkflowError> {
	if !can_transition(from, to) {
		return Err(WorkflowError::InvalidTransition { from, to });
	}
	if !delivery_permits(delivery, from, to) {
		return Err(WorkflowError::TransitionNotPermittedForDelivery { from, to, delivery });
	}
	Ok(())
}

/// Returns the statuses reachable from `status` for an order of this delivery type.
pub fn next_statuses_for(status: OrderStatus, delivery: DeliveryType) -> Vec<OrderStatus> {
	valid_transitions(status)
		.into_iter()
		.filter(|to| delivery_permits(delivery, status, *to))
		.collect()
}
