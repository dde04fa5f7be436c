//! File-based storage backend.
//!
//! Each key is one `.bin` file under the configured directory. Files start
//! with a fixed header carrying the expiry time, so TTLs survive restarts and
//! expired records can be swept by [`cleanup_expired`].
//!
//! [`cleanup_expired`]: crate::StorageInterface::cleanup_expired

use crate::{StorageError, StorageFactory, StorageInterface, StorageRegistry};
use async_trait::async_trait;
use shop_types::{
	current_timestamp, ConfigSchema, Field, FieldType, ImplementationRegistry, Schema, StorageKey,
	ValidationError,
};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use tokio::fs;

const DEFAULT_STORAGE_PATH: &str = "./data/storage";

/// Fixed-size record header.
///
/// Layout (32 bytes):
/// - `[0..4]`: magic `SHOP`
/// - `[4..6]`: format version, u16 little-endian
/// - `[6..14]`: expiry as unix seconds, u64 little-endian, 0 = never
/// - `[14..32]`: reserved, zero
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RecordHeader {
	version: u16,
	expires_at: u64,
}

impl RecordHeader {
	const MAGIC: &'static [u8; 4] = b"SHOP";
	const VERSION: u16 = 1;
	const SIZE: usize = 32;

	fn new(ttl: Duration) -> Self {
		let expires_at = if ttl.is_zero() {
			0
		} else {
			current_timestamp().saturating_add(ttl.as_secs().max(1))
		};
		Self {
			version: Self::VERSION,
			expires_at,
		}
	}

	fn encode(&self) -> [u8; Self::SIZE] {
		let mut bytes = [0u8; Self::SIZE];
		bytes[0..4].copy_from_slice(Self::MAGIC);
		bytes[4..6].copy_from_slice(&self.version.to_le_bytes());
		bytes[6..14].copy_from_slice(&self.expires_at.to_le_bytes());
		bytes
	}

	fn decode(bytes: &[u8]) -> Result<Self, StorageError> {
		if bytes.len() < Self::SIZE {
			return Err(StorageError::Backend("record too small for header".into()));
		}
		if &bytes[0..4] != Self::MAGIC {
			return Err(StorageError::Backend("record header magic mismatch".into()));
		}

		let version = u16::from_le_bytes([bytes[4], bytes[5]]);
		if version > Self::VERSION {
			return Err(StorageError::Backend(format!(
				"unsupported record version: {}",
				version
			)));
		}

		let mut expires = [0u8; 8];
		expires.copy_from_slice(&bytes[6..14]);
		Ok(Self {
			version,
			expires_at: u64::from_le_bytes(expires),
		})
	}

	fn is_expired(&self) -> bool {
		self.expires_at != 0 && current_timestamp() >= self.expires_at
	}
}

/// Default TTLs per storage namespace, read from `ttl_<namespace>` keys.
#[derive(Debug, Clone, Default)]
pub struct TtlConfig {
	ttls: HashMap<StorageKey, Duration>,
}

impl TtlConfig {
	fn from_config(config: &toml::Value) -> Self {
		let ttls = StorageKey::all()
			.filter_map(|key| {
				config
					.get(ttl_field(key))
					.and_then(|v| v.as_integer())
					.and_then(|secs| u64::try_from(secs).ok())
					.map(|secs| (key, Duration::from_secs(secs)))
			})
			.collect();
		Self { ttls }
	}

	fn ttl_for(&self, key: StorageKey) -> Duration {
		self.ttls.get(&key).copied().unwrap_or(Duration::ZERO)
	}
}

fn ttl_field(key: StorageKey) -> String {
	format!("ttl_{}", key.as_str())
}

/// File-based storage implementation.
pub struct FileStorage {
	base_path: PathBuf,
	ttl_config: TtlConfig,
}

impl FileStorage {
	/// Creates a store rooted at `base_path`.
	pub fn new(base_path: PathBuf, ttl_config: TtlConfig) -> Self {
		Self {
			base_path,
			ttl_config,
		}
	}

	fn file_path(&self, key: &str) -> PathBuf {
		let safe_key = key.replace(['/', '\\', ':'], "_");
		self.base_path.join(format!("{}.bin", safe_key))
	}

	/// TTL applied when the caller does not pass one, e.g. "orders:123" uses `ttl_orders`.
	fn default_ttl(&self, key: &str) -> Duration {
		key.split(':')
			.next()
			.and_then(|namespace| namespace.parse::<StorageKey>().ok())
			.map(|namespace| self.ttl_config.ttl_for(namespace))
			.unwrap_or(Duration::ZERO)
	}

	async fn read_record(&self, key: &str) -> Result<Option<(RecordHeader, Vec<u8>)>, StorageError> {
		let data = match fs::read(self.file_path(key)).await {
			Ok(data) => data,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
			Err(e) => return Err(StorageError::Backend(e.to_string())),
		};
		let header = RecordHeader::decode(&data)?;
		Ok(Some((header, data[RecordHeader::SIZE..].to_vec())))
	}

	async fn sweep(&self) -> Result<usize, StorageError> {
		let mut entries = match fs::read_dir(&self.base_path).await {
			Ok(entries) => entries,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
			Err(e) => return Err(StorageError::Backend(e.to_string())),
		};

		let mut removed = 0;
		while let Some(entry) = entries
			.next_entry()
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?
		{
			let path = entry.path();
			if path.extension() != Some(std::ffi::OsStr::new("bin")) {
				continue;
			}
			let data = match fs::read(&path).await {
				Ok(data) => data,
				Err(e) => {
					tracing::debug!("Skipping {:?}: could not be read: {}", path, e);
					continue;
				},
			};
			match RecordHeader::decode(&data) {
				Ok(header) if header.is_expired() => match fs::remove_file(&path).await {
					Ok(()) => removed += 1,
					Err(e) => tracing::warn!("Failed to remove expired record {:?}: {}", path, e),
				},
				Ok(_) => {},
				Err(e) => tracing::debug!("Skipping {:?}: {}", path, e),
			}
		}
		Ok(removed)
	}
}

#[async_trait]
impl StorageInterface for FileStorage {
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError> {
		match self.read_record(key).await? {
			Some((header, body)) if !header.is_expired() => Ok(body),
			_ => Err(StorageError::NotFound),
		}
	}

	async fn set_bytes(
		&self,
		key: &str,
		value: Vec<u8>,
		ttl: Option<Duration>,
	) -> Result<(), StorageError> {
		fs::create_dir_all(&self.base_path)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;

		let ttl = ttl.unwrap_or_else(|| self.default_ttl(key));
		let header = RecordHeader::new(ttl);

		let mut record = Vec::with_capacity(RecordHeader::SIZE + value.len());
		record.extend_from_slice(&header.encode());
		record.extend_from_slice(&value);

		// Write to a sibling temp file and rename so readers never see a partial record.
		let path = self.file_path(key);
		let temp_path = path.with_extension("tmp");
		fs::write(&temp_path, record)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;
		fs::rename(&temp_path, &path)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))
	}

	async fn delete(&self, key: &str) -> Result<(), StorageError> {
		match fs::remove_file(self.file_path(key)).await {
			Ok(()) => Ok(()),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
			Err(e) => Err(StorageError::Backend(e.to_string())),
		}
	}

	async fn exists(&self, key: &str) -> Result<bool, StorageError> {
		Ok(self
			.read_record(key)
			.await?
			.is_some_and(|(header, _)| !header.is_expired()))
	}

	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(FileStorageSchema)
	}

	async fn cleanup_expired(&self) -> Result<usize, StorageError> {
		self.sweep().await
	}
}

/// Configuration schema for FileStorage.
pub struct FileStorageSchema;

impl ConfigSchema for FileStorageSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let mut optional = vec![Field::new("storage_path", FieldType::String)];
		optional.extend(StorageKey::all().map(|key| {
			Field::new(
				ttl_field(key),
				FieldType::Integer {
					min: Some(0),
					max: None,
				},
			)
		}));
		Schema::new(vec![], optional).validate(config)
	}
}

/// Factory function to create a file storage backend from configuration.
///
/// Configuration parameters:
/// - `storage_path`: base directory (default: "./data/storage")
/// - `ttl_orders`: TTL in seconds for order records (default: 0, never expire)
/// - `ttl_customer_orders`: TTL in seconds for the per-phone index (default: 0)
pub fn create_storage(config: &toml::Value) -> Result<Box<dyn StorageInterface>, StorageError> {
	FileStorageSchema
		.validate(config)
		.map_err(|e| StorageError::Configuration(e.to_string()))?;

	let storage_path = config
		.get("storage_path")
		.and_then(|v| v.as_str())
		.unwrap_or(DEFAULT_STORAGE_PATH);

	Ok(Box::new(FileStorage::new(
		PathBuf::from(storage_path),
		TtlConfig::from_config(config),
	)))
}

/// Registry for the file storage implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "file";
	type Factory = StorageFactory;

	fn factory() -> Self::Factory {
		create_storage
	}
}

impl StorageRegistry for Registry {}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::TempDir;

	fn storage(dir: &TempDir) -> FileStorage {
		FileStorage::new(dir.path().to_path_buf(), TtlConfig::default())
	}

	#[test]
	fn test_header_encoding() {
		let header = RecordHeader::new(Duration::ZERO);
		let decoded = RecordHeader::decode(&header.encode()).unwrap();
		assert_eq!(decoded, header);
		assert!(!decoded.is_expired());

		assert!(RecordHeader::decode(b"SHOP").is_err());
		assert!(RecordHeader::decode(&[0u8; RecordHeader::SIZE]).is_err());
	}

	#[test]
	fn test_past_expiry_is_expired() {
		let header = RecordHeader {
			version: RecordHeader::VERSION,
			expires_at: 1,
		};
		assert!(header.is_expired());
	}

	#[tokio::test]
	async fn test_basic_operations() {
		let dir = TempDir::new().unwrap();
		let storage = storage(&dir);

		storage
			.set_bytes("orders:o-1", b"payload".to_vec(), None)
			.await
			.unwrap();
		assert_eq!(storage.get_bytes("orders:o-1").await.unwrap(), b"payload");
		assert!(storage.exists("orders:o-1").await.unwrap());
		assert!(dir.path().join("orders_o-1.bin").exists());

		storage.delete("orders:o-1").await.unwrap();
		assert!(!storage.exists("orders:o-1").await.unwrap());
		assert!(matches!(
			storage.get_bytes("orders:o-1").await,
			Err(StorageError::NotFound)
		));
	}

	#[tokio::test]
	async fn test_cleanup_removes_only_expired_records() {
		let dir = TempDir::new().unwrap();
		let storage = storage(&dir);

		storage
			.set_bytes("orders:live", b"1".to_vec(), None)
			.await
			.unwrap();
		let expired = RecordHeader {
			version: RecordHeader::VERSION,
			expires_at: 1,
		};
		let mut record = expired.encode().to_vec();
		record.extend_from_slice(b"2");
		std::fs::write(dir.path().join("orders_stale.bin"), record).unwrap();

		assert!(!storage.exists("orders:stale").await.unwrap());
		assert_eq!(storage.cleanup_expired().await.unwrap(), 1);
		assert!(!dir.path().join("orders_stale.bin").exists());
		assert!(storage.exists("orders:live").await.unwrap());
	}

	#[test]
	fn test_ttl_defaults_by_namespace() {
		let config: toml::Value =
			toml::from_str("storage_path = \"/tmp/x\"\nttl_customer_orders = 3600").unwrap();
		let storage = FileStorage::new(PathBuf::from("/tmp/x"), TtlConfig::from_config(&config));
		assert_eq!(
			storage.default_ttl("customer_orders:0791234567"),
			Duration::from_secs(3600)
		);
		assert_eq!(storage.default_ttl("orders:o-1"), Duration::ZERO);
		assert_eq!(storage.default_ttl("unknown:o-1"), Duration::ZERO);
	}

	#[test]
	fn test_schema_rejects_negative_ttl() {
		let config: toml::Value = toml::from_str("ttl_orders = -5").unwrap();
		assert!(FileStorageSchema.validate(&config).is_err());
		assert!(matches!(
			create_storage(&config),
			Err(StorageError::Configuration(_))
		));
	}
}
