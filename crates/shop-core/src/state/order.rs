//! Order state machine.
//!
//! Persists orders and applies status transitions. A transition is read,
//! checked against the workflow table for the order's delivery type, and
//! written back while holding the write lock, so two concurrent updates of
//! the same order cannot both pass the check against a stale status.

use shop_storage::{StorageError, StorageService};
use shop_types::{
	check_transition, current_timestamp, Order, OrderStatus, StatusChange, StorageKey,
	WorkflowError,
};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

/// Errors that can occur during order state management.
#[derive(Debug, Error)]
pub enum OrderStateError {
	#[error("Storage error: {0}")]
	Storage(String),
	#[error("Order not found: {0}")]
	OrderNotFound(String),
	/// The workflow refused the change; nothing was written.
	#[error(transparent)]
	Rejected(#[from] WorkflowError),
}

impl OrderStateError {
	fn from_storage(order_id: &str, err: StorageError) -> Self {
		match err {
			StorageError::NotFound => OrderStateError::OrderNotFound(order_id.to_string()),
			other => OrderStateError::Storage(other.to_string()),
		}
	}
}

/// Manages order persistence and status transitions.
pub struct OrderStateMachine {
	storage: Arc<StorageService>,
	/// Serializes read-modify-write cycles.
	write_lock: Mutex<()>,
}

impl OrderStateMachine {
	pub fn new(storage: Arc<StorageService>) -> Self {
		Self {
			storage,
			write_lock: Mutex::new(()),
		}
	}

	/// Gets an order by ID.
	pub async fn get_order(&self, order_id: &str) -> Result<Order, OrderStateError> {
		self.storage
			.retrieve(StorageKey::Orders, order_id)
			.await
			.map_err(|e| OrderStateError::from_storage(order_id, e))
	}

	/// Stores a new order.
	pub async fn store_order(&self, order: &Order) -> Result<(), OrderStateError> {
		self.storage
			.store(StorageKey::Orders, &order.id, order)
			.await
			.map_err(|e| OrderStateError::Storage(e.to_string()))
	}

	/// Deletes a stored order. Used to undo a checkout that could not be indexed.
	pub async fn remove_order(&self, order_id: &str) -> Result<(), OrderStateError> {
		self.storage
			.remove(StorageKey::Orders, order_id)
			.await
			.map_err(|e| OrderStateError::Storage(e.to_string()))
	}

	/// Moves an order to `new_status` if the workflow allows it.
	///
	/// On success the change is appended to the order history. On rejection
	/// the stored order is left untouched.
	pub async fn transition_order_status(
		&self,
		order_id: &str,
		new_status: OrderStatus,
	) -> Result<Order, OrderStateError> {
		let _guard = self.write_lock.lock().await;
		let mut order = self.get_order(order_id).await?;

		check_transition(order.status, new_status, order.delivery_type)?;

		order.history.push(StatusChange {
			from: order.status,
			to: new_status,
			at: current_timestamp(),
		});
		order.status = new_status;
		self.persist(order).await
	}

	/// Appends an order id to the history index of a phone number.
	pub async fn index_customer_order(
		&self,
		phone: &str,
		order_id: &str,
	) -> Result<(), OrderStateError> {
		let _guard = self.write_lock.lock().await;
		let mut ids = self.customer_order_ids(phone).await?;
		if !ids.iter().any(|id| id == order_id) {
			ids.push(order_id.to_string());
		}
		self.storage
			.store(StorageKey::CustomerOrders, phone, &ids)
			.await
			.map_err(|e| OrderStateError::Storage(e.to_string()))
	}

	/// Order ids placed under a phone number, oldest first.
	pub async fn customer_order_ids(&self, phone: &str) -> Result<Vec<String>, OrderStateError> {
		self.storage
			.retrieve_optional(StorageKey::CustomerOrders, phone)
			.await
			.map(Option::unwrap_or_default)
			.map_err(|e| OrderStateError::Storage(e.to_string()))
	}

	async fn persist(&self, mut order: Order) -> Result<Order, OrderStateError> {
		order.updated_at = current_timestamp();
		self.storage
			.update(StorageKey::Orders, &order.id, &order)
			.await
			.map_err(|e| OrderStateError::from_storage(&order.id, e))?;
		Ok(order)
	}
}
