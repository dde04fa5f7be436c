//! Event bus for broadcasting shop events.
//!
//! A thin wrapper over a tokio broadcast channel. Every subscriber sees
//! every event published after it subscribed; slow subscribers lag and lose
//! the oldest events instead of blocking publishers.

use shop_types::ShopEvent;
use tokio::sync::broadcast;

/// Cloneable handle to the shared event channel.
#[derive(Clone)]
pub struct EventBus {
	sender: broadcast::Sender<ShopEvent>,
}

impl EventBus {
	/// Creates a bus that buffers up to `capacity` events per subscriber.
	pub fn new(capacity: usize) -> Self {
		let (sender, _) = broadcast::channel(capacity);
		Self { sender }
	}

	/// Returns a receiver for events published from now on.
	pub fn subscribe(&self) -> broadcast::Receiver<ShopEvent> {
		self.sender.subscribe()
	}

	/// Publishes an event to all current subscribers.
	///
	/// Returns the number of subscribers reached, or an error when there
	/// are none.
	pub fn publish(
		&self,
		event: ShopEvent,
	) -> Result<usize, broadcast::error::SendError<ShopEvent>> {
		self.sender.send(event)
	}

	/// Number of live subscribers.
	pub fn subscriber_count(&self) -> usize {
		self.sender.receiver_count()
	}
}

impl Default for EventBus {
	fn default() -> Self {
		Self::new(1000)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use shop_types::CacheEvent;

	fn revalidated(tag: &str) -> ShopEvent {
		ShopEvent::Cache(CacheEvent::TagRevalidated { tag: tag.into() })
	}

	#[tokio::test]
	async fn test_every_subscriber_receives_event() {
		let bus = EventBus::new(8);
		let mut first = bus.subscribe();
		let mut second = bus.subscribe();
		assert_eq!(bus.subscriber_count(), 2);

		assert_eq!(bus.publish(revalidated("orders")).unwrap(), 2);

		for rx in [&mut first, &mut second] {
			match rx.recv().await.unwrap() {
				ShopEvent::Cache(CacheEvent::TagRevalidated { tag }) => assert_eq!(tag, "orders"),
				other => panic!("unexpected event: {:?}", other),
			}
		}
	}

	#[test]
	fn test_publish_without_subscribers_fails() {
		let bus = EventBus::new(8);
		assert!(bus.publish(revalidated("orders")).is_err());
	}

	#[tokio::test]
	async fn test_late_subscriber_misses_earlier_events() {
		let bus = EventBus::new(8);
		let _keep = bus.subscribe();
		bus.publish(revalidated("early")).unwrap();

		let mut late = bus.subscribe();
		bus.publish(revalidated("late")).unwrap();
		match late.recv().await.unwrap() {
			ShopEvent::Cache(CacheEvent::TagRevalidated { tag }) => assert_eq!(tag, "late"),
			other => panic!("unexpected event: {:?}", other),
		}
	}
}
