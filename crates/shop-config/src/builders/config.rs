//! Configuration builder for tests.

use crate::{ApiConfig, CacheConfig, Config, ShopConfig, StorageConfig};
use std::collections::HashMap;

/// Builds a valid in-memory [`Config`] with overridable fields.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
	shop_id: String,
	storage_primary: String,
	storage_implementations: HashMap<String, toml::Value>,
	cleanup_interval_seconds: u64,
	cache: CacheConfig,
	api: Option<ApiConfig>,
}

impl Default for ConfigBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigBuilder {
	/// Memory storage, default cache tags, no API.
	pub fn new() -> Self {
		Self {
			shop_id: "test-shop".to_string(),
			storage_primary: "memory".to_string(),
			storage_implementations: HashMap::from([(
				"memory".to_string(),
				toml::Value::Table(toml::Table::new()),
			)]),
			cleanup_interval_seconds: 60,
			cache: CacheConfig::default(),
			api: None,
		}
	}

	pub fn shop_id(mut self, id: impl Into<String>) -> Self {
		self.shop_id = id.into();
		self
	}

	/// Adds a storage implementation and makes it primary.
	pub fn storage(mut self, name: impl Into<String>, config: toml::Value) -> Self {
		let name = name.into();
		self.storage_implementations.insert(name.clone(), config);
		self.storage_primary = name;
		self
	}

	pub fn cleanup_interval_seconds(mut self, interval: u64) -> Self {
		self.cleanup_interval_seconds = interval;
		self
	}

	pub fn cache(mut self, cache: CacheConfig) -> Self {
		self.cache = cache;
		self
	}

	pub fn api(mut self, api: Option<ApiConfig>) -> Self {
		self.api = api;
		self
	}

	pub fn build(self) -> Config {
		Config {
			shop: ShopConfig { id: self.shop_id },
			storage: StorageConfig {
				primary: self.storage_primary,
				implementations: self.storage_implementations,
				cleanup_interval_seconds: self.cleanup_interval_seconds,
			},
			cache: self.cache,
			api: self.api,
		}
	}
}
