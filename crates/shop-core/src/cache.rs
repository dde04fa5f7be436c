//! Cache invalidation after order writes.
//!
//! Read paths (order lists, order detail pages) are cached by tag. After an
//! order write has been persisted the handlers ask a [`CacheInvalidator`] to
//! revalidate the list tag and the tag of the touched order. Invalidation is
//! never requested for a write that was rejected or failed to persist.

use crate::engine::event_bus::EventBus;
use async_trait::async_trait;
use shop_config::CacheConfig;
use shop_types::{CacheEvent, ShopEvent};
use thiserror::Error;

/// Errors raised by cache invalidators.
#[derive(Debug, Error)]
pub enum CacheError {
	#[error("Cache invalidation failed for tag '{tag}': {reason}")]
	Invalidation { tag: String, reason: String },
}

/// Revalidates cached read paths by tag.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheInvalidator: Send + Sync {
	/// Marks everything cached under `tag` as stale.
	async fn revalidate_tag(&self, tag: &str) -> Result<(), CacheError>;
}

/// Invalidator that announces revalidations on the event bus.
///
/// Cache front-ends subscribe to the bus and drop entries for the tag.
pub struct EventBusInvalidator {
	event_bus: EventBus,
}

impl EventBusInvalidator {
	pub fn new(event_bus: EventBus) -> Self {
		Self { event_bus }
	}
}

#[async_trait]
impl CacheInvalidator for EventBusInvalidator {
	async fn revalidate_tag(&self, tag: &str) -> Result<(), CacheError> {
		let event = ShopEvent::Cache(CacheEvent::TagRevalidated {
			tag: tag.to_string(),
		});
		// No subscriber means no cache to invalidate.
		if self.event_bus.publish(event).is_err() {
			tracing::debug!(tag, "No cache subscribers");
		}
		Ok(())
	}
}

/// Revalidates the list tag and the detail tag of one order, in that order.
pub(crate) async fn invalidate_order(
	invalidator: &dyn CacheInvalidator,
	cache: &CacheConfig,
	order_id: &str,
) -> Result<(), CacheError> {
	invalidator.revalidate_tag(&cache.orders_tag).await?;
	invalidator.revalidate_tag(&cache.order_tag(order_id)).await
}
