//! Configuration for the storefront service.
//!
//! Configuration is read from TOML. String values may reference environment
//! variables as `${VAR}` or `${VAR:-default}`, and a file may pull in other
//! files with `include = ["storage.toml"]`. Each top-level section must be
//! defined in exactly one file.

#[cfg(feature = "testing")]
pub mod builders {
	pub mod config;
}
mod loader;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Keep the message only; the default rendering echoes the input.
		ConfigError::Parse(err.message().to_string())
	}
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Identity of this shop instance.
	pub shop: ShopConfig,
	/// Configuration for the storage backend.
	pub storage: StorageConfig,
	/// Cache tags invalidated after order writes.
	#[serde(default)]
	pub cache: CacheConfig,
	/// Configuration for the HTTP API server.
	pub api: Option<ApiConfig>,
}

/// Configuration specific to the shop instance.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ShopConfig {
	/// Unique identifier for this instance, used in logs.
	pub id: String,
}

/// Configuration for the storage backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of storage implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
	/// Interval in seconds between sweeps of expired entries.
	#[serde(default = "default_cleanup_interval_seconds")]
	pub cleanup_interval_seconds: u64,
}

fn default_cleanup_interval_seconds() -> u64 {
	60
}

/// Cache tags revalidated after orders change.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
	/// Tag covering every order listing.
	#[serde(default = "default_orders_tag")]
	pub orders_tag: String,
	/// Prefix of the per-order tag; the order id is appended.
	#[serde(default = "default_order_tag_prefix")]
	pub order_tag_prefix: String,
}

impl Default for CacheConfig {
	fn default() -> Self {
		Self {
			orders_tag: default_orders_tag(),
			order_tag_prefix: default_order_tag_prefix(),
		}
	}
}

impl CacheConfig {
	/// Tag of the detail view of one order.
	pub fn order_tag(&self, order_id: &str) -> String {
		format!("{}{}", self.order_tag_prefix, order_id)
	}
}

fn default_orders_tag() -> String {
	"orders".to_string()
}

fn default_order_tag_prefix() -> String {
	"order:".to_string()
}

/// Configuration for the HTTP API server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
	/// Whether the API server is enabled.
	#[serde(default)]
	pub enabled: bool,
	/// Host address to bind the server to.
	#[serde(default = "default_api_host")]
	pub host: String,
	/// Port to bind the server to.
	#[serde(default = "default_api_port")]
	pub port: u16,
	/// Maximum request body size in bytes.
	#[serde(default = "default_max_request_size")]
	pub max_request_size: usize,
	/// CORS configuration. Any origin is allowed when absent.
	pub cors: Option<CorsConfig>,
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CorsConfig {
	/// Allowed origins for CORS.
	pub allowed_origins: Vec<String>,
}

fn default_api_host() -> String {
	"127.0.0.1".to_string()
}

fn default_api_port() -> u16 {
	3000
}

/// 64 KiB; checkout bodies are small.
fn default_max_request_size() -> usize {
	64 * 1024
}

/// Resolves environment variables in a string.
///
/// Replaces `${VAR_NAME}` with the value of the environment variable and
/// `${VAR_NAME:-default}` with the default when the variable is unset.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut resolved = String::with_capacity(input.len());
	let mut last = 0;
	for cap in re.captures_iter(input) {
		let (Some(full), Some(name)) = (cap.get(0), cap.get(1)) else {
			continue;
		};
		let value = match (std::env::var(name.as_str()), cap.get(2)) {
			(Ok(value), _) => value,
			(Err(_), Some(default)) => default.as_str().to_string(),
			(Err(_), None) => {
				return Err(ConfigError::Validation(format!(
					"Environment variable '{}' not found",
					name.as_str()
				)))
			},
		};
		resolved.push_str(&input[last..full.start()]);
		resolved.push_str(&value);
		last = full.end();
	}
	resolved.push_str(&input[last..]);

	Ok(resolved)
}

impl Config {
	/// Loads configuration from a file, following `include` directives.
	pub async fn from_file(path: &str) -> Result<Self, ConfigError> {
		let path_buf = Path::new(path);
		let base_dir = path_buf.parent().unwrap_or_else(|| Path::new("."));

		let mut loader = loader::ConfigLoader::new(base_dir);
		let file_name = path_buf
			.file_name()
			.ok_or_else(|| ConfigError::Validation(format!("Invalid path: {}", path)))?;
		loader.load_config(file_name).await
	}

	/// Checks cross-field rules serde cannot express.
	fn validate(&self) -> Result<(), ConfigError> {
		if self.shop.id.trim().is_empty() {
			return Err(ConfigError::Validation("Shop ID cannot be empty".into()));
		}

		if self.storage.implementations.is_empty() {
			return Err(ConfigError::Validation(
				"At least one storage implementation must be configured".into(),
			));
		}
		if self.storage.primary.is_empty() {
			return Err(ConfigError::Validation(
				"Storage primary implementation cannot be empty".into(),
			));
		}
		if !self
			.storage
			.implementations
			.contains_key(&self.storage.primary)
		{
			return Err(ConfigError::Validation(format!(
				"Primary storage '{}' not found in implementations",
				self.storage.primary
			)));
		}
		if !(1..=86400).contains(&self.storage.cleanup_interval_seconds) {
			return Err(ConfigError::Validation(
				"Storage cleanup_interval_seconds must be between 1 and 86400".into(),
			));
		}

		if self.cache.orders_tag.is_empty() || self.cache.order_tag_prefix.is_empty() {
			return Err(ConfigError::Validation(
				"Cache tags cannot be empty".into(),
			));
		}

		if let Some(api) = self.api.as_ref().filter(|api| api.enabled) {
			if api.host.is_empty() {
				return Err(ConfigError::Validation("API host cannot be empty".into()));
			}
			if api.max_request_size == 0 {
				return Err(ConfigError::Validation(
					"API max_request_size must be greater than 0".into(),
				));
			}
		}

		Ok(())
	}
}

/// Parses TOML, resolving environment variables and validating the result.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const MINIMAL: &str = r#"
[shop]
id = "storefront"

[storage]
primary = "memory"
[storage.implementations.memory]
"#;

	#[test]
	fn test_env_var_resolution() {
		std::env::set_var("SHOP_TEST_HOST", "localhost");
		std::env::set_var("SHOP_TEST_PORT", "8080");

		let input = "host = \"${SHOP_TEST_HOST}:${SHOP_TEST_PORT}\"";
		assert_eq!(
			resolve_env_vars(input).unwrap(),
			"host = \"localhost:8080\""
		);

		std::env::remove_var("SHOP_TEST_HOST");
		std::env::remove_var("SHOP_TEST_PORT");
	}

	#[test]
	fn test_env_var_with_default() {
		let input = "path = \"${SHOP_MISSING_PATH:-./data}\"";
		assert_eq!(resolve_env_vars(input).unwrap(), "path = \"./data\"");
	}

	#[test]
	fn test_missing_env_var_error() {
		let result = resolve_env_vars("id = \"${SHOP_MISSING_ID}\"");
		assert!(result.unwrap_err().to_string().contains("SHOP_MISSING_ID"));
	}

	#[test]
	fn test_minimal_config_uses_defaults() {
		let config: Config = MINIMAL.parse().unwrap();
		assert_eq!(config.shop.id, "storefront");
		assert_eq!(config.storage.cleanup_interval_seconds, 60);
		assert_eq!(config.cache.orders_tag, "orders");
		assert_eq!(config.cache.order_tag("abc"), "order:abc");
		assert!(config.api.is_none());
	}

	#[test]
	fn test_full_config() {
		let config: Config = r#"
[shop]
id = "${SHOP_TEST_FULL_ID:-downtown}"

[storage]
primary = "file"
cleanup_interval_seconds = 300
[storage.implementations.file]
storage_path = "./data/orders"
ttl_customer_orders = 86400

[cache]
orders_tag = "admin-orders"
order_tag_prefix = "admin-order:"

[api]
enabled = true
port = 8081
[api.cors]
allowed_origins = ["https://shop.example"]
"#
		.parse()
		.unwrap();

		assert_eq!(config.shop.id, "downtown");
		assert_eq!(config.storage.primary, "file");
		assert_eq!(config.cache.order_tag("7"), "admin-order:7");
		let api = config.api.unwrap();
		assert_eq!(api.host, "127.0.0.1");
		assert_eq!(api.port, 8081);
		assert_eq!(api.cors.unwrap().allowed_origins.len(), 1);
	}

	#[test]
	fn test_validation_failures() {
		let cases = [
			(MINIMAL.replace("storefront", " "), "Shop ID"),
			(
				MINIMAL.replace("primary = \"memory\"", "primary = \"redis\""),
				"'redis' not found",
			),
			(
				MINIMAL.replace(
					"primary = \"memory\"",
					"primary = \"memory\"\ncleanup_interval_seconds = 0",
				),
				"cleanup_interval_seconds",
			),
			(
				format!("{}\n[cache]\norders_tag = \"\"\n", MINIMAL),
				"Cache tags",
			),
		];

		for (input, expected) in cases {
			let err = input.parse::<Config>().unwrap_err();
			assert!(
				matches!(err, ConfigError::Validation(_)),
				"{}: {:?}",
				expected,
				err
			);
			assert!(err.to_string().contains(expected), "{}", err);
		}
	}

	#[test]
	fn test_parse_error_is_reported() {
		let err = "[shop\nid = 1".parse::<Config>().unwrap_err();
		assert!(matches!(err, ConfigError::Parse(_)));
	}
}
