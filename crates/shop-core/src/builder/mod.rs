//! Builder pattern for constructing shop engines.
//!
//! Composes a [`ShopEngine`] from the configured storage backend using
//! factory functions keyed by implementation name.

use crate::cache::{CacheInvalidator, EventBusInvalidator};
use crate::engine::{event_bus::EventBus, ShopEngine};
use shop_config::Config;
use shop_storage::{StorageError, StorageInterface, StorageService};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during shop engine construction.
#[derive(Debug, Error)]
pub enum BuilderError {
	#[error("Configuration error: {0}")]
	Config(String),
	#[error("Missing required component: {0}")]
	MissingComponent(String),
}

/// Container for the factory functions needed to build a ShopEngine.
///
/// Each factory takes the TOML table of its implementation and returns the
/// backend.
pub struct ShopFactories<SF> {
	pub storage_factories: HashMap<String, SF>,
}

/// Builder for constructing a ShopEngine with pluggable implementations.
pub struct ShopBuilder {
	config: Config,
	event_bus: EventBus,
	invalidator: Option<Arc<dyn CacheInvalidator>>,
}

impl ShopBuilder {
	/// Creates a new ShopBuilder with the given configuration.
	pub fn new(config: Config) -> Self {
		Self {
			config,
			event_bus: EventBus::new(1000),
			invalidator: None,
		}
	}

	/// Replaces the default invalidator, which announces tags on the event bus.
	pub fn with_invalidator(mut self, invalidator: Arc<dyn CacheInvalidator>) -> Self {
		self.invalidator = Some(invalidator);
		self
	}

	/// Builds the ShopEngine using the storage factories.
	pub fn build<SF>(self, factories: ShopFactories<SF>) -> Result<ShopEngine, BuilderError>
	where
		SF: Fn(&toml::Value) -> Result<Box<dyn StorageInterface>, StorageError>,
	{
		let primary_storage = &self.config.storage.primary;
		let factory = factories
			.storage_factories
			.get(primary_storage)
			.ok_or_else(|| {
				BuilderError::MissingComponent(format!(
					"No storage factory registered for '{}'",
					primary_storage
				))
			})?;
		let storage_config = self
			.config
			.storage
			.implementations
			.get(primary_storage)
			.ok_or_else(|| {
				BuilderError::Config(format!(
					"Primary storage '{}' has no configuration table",
					primary_storage
				))
			})?;

		// Only the primary backend is built; other tables stay dormant.
		let storage_backend = factory(storage_config).map_err(|e| {
			tracing::error!(
				component = "storage",
				implementation = %primary_storage,
				error = %e,
				"Failed to create storage implementation"
			);
			BuilderError::Config(format!(
				"Failed to create storage implementation '{}': {}",
				primary_storage, e
			))
		})?;
		tracing::info!(component = "storage", implementation = %primary_storage, enabled = true, "Loaded");

		let storage = Arc::new(StorageService::new(storage_backend));

		let invalidator = self
			.invalidator
			.unwrap_or_else(|| Arc::new(EventBusInvalidator::new(self.event_bus.clone())));

		Ok(ShopEngine::new(
			self.config,
			storage,
			self.event_bus,
			invalidator,
		))
	}
}
