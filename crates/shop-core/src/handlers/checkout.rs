//! Checkout handler for placing orders.
//!
//! Validates the submission, stores the new order and indexes it under the
//! customer's phone number, then announces it and invalidates the order list.

use crate::cache::{invalidate_order, CacheInvalidator};
use crate::engine::event_bus::EventBus;
use crate::state::OrderStateMachine;
use shop_config::CacheConfig;
use shop_types::{
	current_timestamp, truncate_id, CheckoutRequest, Order, OrderEvent, ShopEvent, WorkflowError,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::instrument;

/// Errors that can occur while placing an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
	/// The submission broke a checkout rule; nothing was stored.
	#[error(transparent)]
	Rejected(#[from] WorkflowError),
	#[error("State error: {0}")]
	State(String),
	/// The order was stored but cached views could not be invalidated.
	#[error("Cache error: {0}")]
	Cache(String),
}

/// Handler for checkout submissions.
pub struct CheckoutHandler {
	state_machine: Arc<OrderStateMachine>,
	event_bus: EventBus,
	invalidator: Arc<dyn CacheInvalidator>,
	cache: CacheConfig,
}

impl CheckoutHandler {
	pub fn new(
		state_machine: Arc<OrderStateMachine>,
		event_bus: EventBus,
		invalidator: Arc<dyn CacheInvalidator>,
		cache: CacheConfig,
	) -> Self {
		Self {
			state_machine,
			event_bus,
			invalidator,
			cache,
		}
	}

	/// Places an order from a checkout submission.
	#[instrument(skip_all, fields(delivery = %request.delivery_type))]
	pub async fn place_order(&self, request: CheckoutRequest) -> Result<Order, CheckoutError> {
		let checkout = request.validate_checkout().inspect_err(|e| {
			tracing::info!(code = e.code(), "Checkout rejected: {}", e);
		})?;

		let order = Order::place(uuid::Uuid::new_v4().to_string(), checkout, current_timestamp());

		self.state_machine
			.store_order(&order)
			.await
			.map_err(|e| CheckoutError::State(e.to_string()))?;
		if let Err(e) = self
			.state_machine
			.index_customer_order(&order.phone, &order.id)
			.await
		{
			// Without its index entry the order would be invisible to the customer.
			if let Err(undo) = self.state_machine.remove_order(&order.id).await {
				tracing::error!(
					order_id = %truncate_id(&order.id),
					"Failed to remove unindexed order: {}",
					undo
				);
			}
			return Err(CheckoutError::State(e.to_string()));
		}

		tracing::info!(
			order_id = %truncate_id(&order.id),
			total = %order.total,
			items = order.items.len(),
			"Order placed"
		);

		self.event_bus
			.publish(ShopEvent::Order(OrderEvent::Placed {
				order: order.clone(),
			}))
			.ok();

		invalidate_order(self.invalidator.as_ref(), &self.cache, &order.id)
			.await
			.map_err(|e| CheckoutError::Cache(e.to_string()))?;

		Ok(order)
	}
}
