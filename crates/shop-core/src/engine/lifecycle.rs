//! Lifecycle management for the shop engine.
//!
//! Handles startup logging and the final storage sweep on shutdown.

use super::{EngineError, ShopEngine};

impl ShopEngine {
	/// Performs any initialization required before running
	pub async fn initialize(&self) -> Result<(), EngineError> {
		tracing::info!(
			shop_id = %self.config.shop.id,
			cleanup_interval = self.config.storage.cleanup_interval_seconds,
			"Initializing shop engine"
		);
		Ok(())
	}

	/// Performs cleanup operations
	pub async fn shutdown(&self) -> Result<(), EngineError> {
		tracing::info!("Shutting down shop engine");

		let removed = self
			.storage
			.cleanup_expired()
			.await
			.map_err(|e| EngineError::Service(e.to_string()))?;
		if removed > 0 {
			tracing::info!("Removed {} expired entries on shutdown", removed);
		}

		Ok(())
	}
}
