//! Event types for inter-service communication.
//!
//! Handlers publish these on the engine's event bus after a change has been
//! persisted, so subscribers only ever observe committed state.

use crate::{Order, OrderStatus};
use serde::{Deserialize, Serialize};

/// Main event type encompassing all shop events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ShopEvent {
	/// Events from order placement and status updates.
	Order(OrderEvent),
	/// Cache invalidation requests.
	Cache(CacheEvent),
}

/// Events related to the order lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OrderEvent {
	/// A checkout was accepted and stored.
	Placed { order: Order },
	/// A status change was accepted and stored.
	StatusChanged {
		order_id: String,
		from: OrderStatus,
		to: OrderStatus,
	},
	/// A status change was refused by the workflow.
	TransitionRejected {
		order_id: String,
		/// Machine code of the failed rule.
		code: String,
		reason: String,
	},
}

/// Events related to cached read paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CacheEvent {
	/// Read paths tagged with `tag` must be revalidated.
	TagRevalidated { tag: String },
}
