//! Shop engine that owns the services and runs the background loop.
//!
//! The engine wires storage, the order state machine and the handlers
//! together. [`ShopEngine::run`] logs the events published by the handlers
//! and periodically sweeps expired storage entries until shutdown.

pub mod event_bus;
pub mod lifecycle;

use crate::cache::CacheInvalidator;
use crate::handlers::{CheckoutHandler, OrderHandler};
use crate::state::OrderStateMachine;
use shop_config::Config;
use shop_storage::StorageService;
use shop_types::{truncate_id, CacheEvent, OrderEvent, ShopEvent};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

/// Errors that can occur during engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
	#[error("Service error: {0}")]
	Service(String),
}

/// Main shop engine.
#[derive(Clone)]
pub struct ShopEngine {
	pub(crate) config: Config,
	pub(crate) storage: Arc<StorageService>,
	pub(crate) event_bus: event_bus::EventBus,
	pub(crate) checkout_handler: Arc<CheckoutHandler>,
	pub(crate) order_handler: Arc<OrderHandler>,
}

impl ShopEngine {
	/// Creates an engine over the given storage and cache invalidator.
	pub fn new(
		config: Config,
		storage: Arc<StorageService>,
		event_bus: event_bus::EventBus,
		invalidator: Arc<dyn CacheInvalidator>,
	) -> Self {
		let state_machine = Arc::new(OrderStateMachine::new(storage.clone()));

		let checkout_handler = Arc::new(CheckoutHandler::new(
			state_machine.clone(),
			event_bus.clone(),
			invalidator.clone(),
			config.cache.clone(),
		));

		let order_handler = Arc::new(OrderHandler::new(
			state_machine,
			event_bus.clone(),
			invalidator,
			config.cache.clone(),
		));

		Self {
			config,
			storage,
			event_bus,
			checkout_handler,
			order_handler,
		}
	}

	/// Runs until Ctrl+C.
	pub async fn run(&self) -> Result<(), EngineError> {
		self.run_until(async {
			if let Err(e) = tokio::signal::ctrl_c().await {
				tracing::error!("Failed to listen for shutdown signal: {}", e);
				std::future::pending::<()>().await;
			}
		})
		.await
	}

	/// Runs until `shutdown` completes.
	pub async fn run_until<F>(&self, shutdown: F) -> Result<(), EngineError>
	where
		F: Future<Output = ()>,
	{
		self.initialize().await?;

		let mut events = self.event_bus.subscribe();
		let cleanup_handle = self.spawn_storage_cleanup();
		tokio::pin!(shutdown);

		loop {
			tokio::select! {
				received = events.recv() => match received {
					Ok(event) => log_event(&event),
					Err(RecvError::Lagged(skipped)) => {
						tracing::warn!("Event log lagged, skipped {} events", skipped);
					},
					Err(RecvError::Closed) => break,
				},

				_ = &mut shutdown => {
					tracing::info!("Shutdown requested");
					break;
				}
			}
		}

		cleanup_handle.abort();
		self.shutdown().await
	}

	fn spawn_storage_cleanup(&self) -> JoinHandle<()> {
		let storage = self.storage.clone();
		let period = Duration::from_secs(self.config.storage.cleanup_interval_seconds);
		tokio::spawn(async move {
			let mut interval = tokio::time::interval(period);
			loop {
				interval.tick().await;
				match storage.cleanup_expired().await {
					Ok(0) => {},
					Ok(count) => {
						tracing::debug!("Storage cleanup: removed {} expired entries", count);
					},
					Err(e) => tracing::warn!("Storage cleanup failed: {}", e),
				}
			}
		})
	}

	/// Returns a reference to the event bus.
	pub fn event_bus(&self) -> &event_bus::EventBus {
		&self.event_bus
	}

	/// Returns a reference to the configuration.
	pub fn config(&self) -> &Config {
		&self.config
	}

	/// Handler for checkout submissions.
	pub fn checkout(&self) -> &CheckoutHandler {
		&self.checkout_handler
	}

	/// Handler for order reads and status changes.
	pub fn orders(&self) -> &OrderHandler {
		&self.order_handler
	}
}

fn log_event(event: &ShopEvent) {
	match event {
		ShopEvent::Order(OrderEvent::Placed { order }) => tracing::info!(
			order_id = %truncate_id(&order.id),
			delivery = %order.delivery_type,
			payment = %order.payment_method,
			"Order placed"
		),
		ShopEvent::Order(OrderEvent::StatusChanged { order_id, from, to }) => tracing::info!(
			order_id = %truncate_id(order_id),
			%from,
			%to,
			"Order status changed"
		),
		ShopEvent::Order(OrderEvent::TransitionRejected {
			order_id,
			code,
			reason,
		}) => tracing::warn!(
			order_id = %truncate_id(order_id),
			code = %code,
			"Transition rejected: {}",
			reason
		),
		ShopEvent::Cache(CacheEvent::TagRevalidated { tag }) => {
			tracing::debug!(tag = %tag, "Cache tag revalidated")
		},
	}
}
