//! Admin view of the order workflow.
//!
//! The back-office speaks of "updating" an order status and shows statuses as
//! select options. Everything here delegates to [`crate::workflow`], including
//! the delivery gate, so the admin picker offers exactly the moves that
//! [`check_transition`] accepts when the update is persisted.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::workflow::{check_transition, is_terminal, next_statuses_for};
use crate::{DeliveryType, OrderStatus};

/// A status as shown in the admin status picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusOption {
	pub value: OrderStatus,
	pub label: String,
	#[serde(rename = "isFinal")]
	pub is_final: bool,
	/// Successors per delivery type.
	pub next: BTreeMap<DeliveryType, Vec<OrderStatus>>,
}

/// Statuses an admin may move an order of this delivery type to from `current`.
pub fn allowed_next_statuses(current: OrderStatus, delivery: DeliveryType) -> Vec<OrderStatus> {
	next_statuses_for(current, delivery)
}

/// Whether an admin status update from `current` to `target` is legal.
pub fn can_update_status(
	current: OrderStatus,
	target: OrderStatus,
	delivery: DeliveryType,
) -> bool {
	check_transition(current, target, delivery).is_ok()
}

/// Whether the order can no longer be updated.
pub fn is_final_status(status: OrderStatus) -> bool {
	is_terminal(status)
}

/// Every status with its label and successors, in lifecycle order.
pub fn status_options() -> Vec<StatusOption> {
	OrderStatus::ALL
		.into_iter()
		.map(|status| StatusOption {
			value: status,
			label: status.label().to_string(),
			is_final: is_final_status(status),
			next: DeliveryType::ALL
				.into_iter()
				.map(|delivery| (delivery, allowed_next_statuses(status, delivery)))
				.collect(),
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::workflow::valid_transitions;

	#[test]
	fn test_admin_gate_matches_persisted_gate() {
		for delivery in DeliveryType::ALL {
			for from in OrderStatus::ALL {
				assert_eq!(is_final_status(from), is_terminal(from));
				for to in OrderStatus::ALL {
					assert_eq!(
						can_update_status(from, to, delivery),
						check_transition(from, to, delivery).is_ok(),
						"{} -> {} for {}",
						from,
						to,
						delivery
					);
					assert_eq!(
						allowed_next_statuses(from, delivery).contains(&to),
						check_transition(from, to, delivery).is_ok()
					);
				}
			}
		}
	}

	#[test]
	fn test_delivery_gate_narrows_admin_options() {
		assert!(!can_update_status(
			OrderStatus::Processing,
			OrderStatus::Delivered,
			DeliveryType::Delivery
		));
		assert!(can_update_status(
			OrderStatus::Processing,
			OrderStatus::Delivered,
			DeliveryType::Pickup
		));
		assert!(!can_update_status(
			OrderStatus::Processing,
			OrderStatus::Shipped,
			DeliveryType::Pickup
		));

		let processing = status_options()
			.into_iter()
			.find(|o| o.value == OrderStatus::Processing)
			.unwrap();
		assert_eq!(
			processing.next[&DeliveryType::Delivery],
			vec![OrderStatus::Shipped, OrderStatus::Cancelled]
		);
		assert_eq!(
			processing.next[&DeliveryType::Pickup],
			vec![OrderStatus::Delivered, OrderStatus::Cancelled]
		);
		for options in processing.next.values() {
			assert!(options
				.iter()
				.all(|to| valid_transitions(OrderStatus::Processing).contains(to)));
		}
	}

	#[test]
	fn test_status_options_cover_every_status() {
		let options = status_options();
		assert_eq!(options.len(), OrderStatus::ALL.len());
		let cancelled = options
			.iter()
			.find(|o| o.value == OrderStatus::Cancelled)
			.unwrap();
		assert!(cancelled.is_final);
		assert!(cancelled.next.values().all(|next| next.is_empty()));
		assert_eq!(cancelled.label, "Cancelled");
	}
}
