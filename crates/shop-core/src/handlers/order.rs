//! Order handler for status updates and order lookups.
//!
//! Admin updates and customer cancellations go through the same
//! [`OrderStateMachine::transition_order_status`] gate. Events and cache
//! invalidation follow only a persisted change.

use crate::cache::{invalidate_order, CacheInvalidator};
use crate::engine::event_bus::EventBus;
use crate::state::{OrderStateError, OrderStateMachine};
use shop_config::CacheConfig;
use shop_types::{
	truncate_id, validate_phone, Order, OrderEvent, OrderStatus, ShopEvent, WorkflowError,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::instrument;

/// Errors that can occur while reading or updating orders.
#[derive(Debug, Error)]
pub enum OrderError {
	#[error("Order not found: {0}")]
	NotFound(String),
	/// The workflow refused the change; the status is unchanged.
	#[error(transparent)]
	Rejected(#[from] WorkflowError),
	#[error("State error: {0}")]
	State(String),
	/// The change was stored but cached views could not be invalidated.
	#[error("Cache error: {0}")]
	Cache(String),
}

impl From<OrderStateError> for OrderError {
	fn from(err: OrderStateError) -> Self {
		match err {
			OrderStateError::OrderNotFound(id) => OrderError::NotFound(id),
			OrderStateError::Rejected(e) => OrderError::Rejected(e),
			OrderStateError::Storage(msg) => OrderError::State(msg),
		}
	}
}

/// Who asked for a status change; only used for logging.
#[derive(Debug, Clone, Copy)]
enum Actor {
	Admin,
	Customer,
}

/// Handler for order reads and status changes.
pub struct OrderHandler {
	state_machine: Arc<OrderStateMachine>,
	event_bus: EventBus,
	invalidator: Arc<dyn CacheInvalidator>,
	cache: CacheConfig,
}

impl OrderHandler {
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

	/// Gets an order by ID.
	pub async fn get_order(&self, order_id: &str) -> Result<Order, OrderError> {
		Ok(self.state_machine.get_order(order_id).await?)
	}

	/// Orders placed under a phone number, newest first.
	///
	/// Index entries whose order no longer exists are skipped.
	pub async fn customer_orders(&self, phone: &str) -> Result<Vec<Order>, OrderError> {
		validate_phone(phone)?;

		let ids = self.state_machine.customer_order_ids(phone).await?;
		let mut orders = Vec::with_capacity(ids.len());
		for id in ids.iter().rev() {
			match self.state_machine.get_order(id).await {
				Ok(order) => orders.push(order),
				Err(OrderStateError::OrderNotFound(_)) => {
					tracing::debug!(order_id = %truncate_id(id), "Indexed order is gone");
				},
				Err(e) => return Err(e.into()),
			}
		}
		Ok(orders)
	}

	/// Applies an admin status update.
	#[instrument(skip_all, fields(order_id = %truncate_id(order_id), to = %status))]
	pub async fn update_status(
		&self,
		order_id: &str,
		status: OrderStatus,
	) -> Result<Order, OrderError> {
		self.apply_transition(order_id, status, Actor::Admin).await
	}

	/// Cancels an order on behalf of the customer.
	///
	/// Subject to the same table as admin updates, so shipped or delivered
	/// orders cannot be cancelled.
	#[instrument(skip_all, fields(order_id = %truncate_id(order_id)))]
	pub async fn cancel(&self, order_id: &str) -> Result<Order, OrderError> {
		self.apply_transition(order_id, OrderStatus::Cancelled, Actor::Customer)
			.await
	}

	async fn apply_transition(
		&self,
		order_id: &str,
		status: OrderStatus,
		actor: Actor,
	) -> Result<Order, OrderError> {
		let order = match self
			.state_machine
			.transition_order_status(order_id, status)
			.await
		{
			Ok(order) => order,
			Err(OrderStateError::Rejected(e)) => {
				tracing::warn!(?actor, code = e.code(), "Status change rejected: {}", e);
				self.event_bus
					.publish(ShopEvent::Order(OrderEvent::TransitionRejected {
						order_id: order_id.to_string(),
						code: e.code().to_string(),
						reason: e.to_string(),
					}))
					.ok();
				return Err(OrderError::Rejected(e));
			},
			Err(e) => return Err(e.into()),
		};

		let from = order
			.history
			.last()
			.map(|change| change.from)
			.unwrap_or(order.status);
		tracing::info!(?actor, %from, "Order status changed");

		self.event_bus
			.publish(ShopEvent::Order(OrderEvent::StatusChanged {
				order_id: order.id.clone(),
				from,
				to: order.status,
			}))
			.ok();

		invalidate_order(self.invalidator.as_ref(), &self.cache, &order.id)
			.await
			.map_err(|e| OrderError::Cache(e.to_string()))?;

		Ok(order)
	}
}
