//! Loading of configuration split across several files.
//!
//! The main file may list other files under `include`. Included files are
//! merged section by section; a top-level section defined in two files is an
//! error, as is a file included twice.

use crate::{resolve_env_vars, Config, ConfigError};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Loads a configuration file together with its includes.
pub struct ConfigLoader {
	/// Directory relative includes are resolved against.
	base_path: PathBuf,
	/// Canonical paths already read.
	loaded_files: HashSet<PathBuf>,
	/// File that defined each top-level section.
	section_sources: HashMap<String, PathBuf>,
}

impl ConfigLoader {
	pub fn new(base_path: impl AsRef<Path>) -> Self {
		Self {
			base_path: base_path.as_ref().to_path_buf(),
			loaded_files: HashSet::new(),
			section_sources: HashMap::new(),
		}
	}

	/// Loads, merges, resolves and validates the configuration.
	pub async fn load_config(
		&mut self,
		config_path: impl AsRef<Path>,
	) -> Result<Config, ConfigError> {
		let config_path = self.resolve_path(config_path)?;
		let main_content = self.read_file(&config_path).await?;
		let mut main_toml: toml::Table = toml::from_str(&main_content)?;

		let includes = extract_includes(&mut main_toml)?;
		if includes.is_empty() {
			return main_content.parse();
		}

		for key in main_toml.keys() {
			self.section_sources
				.insert(key.clone(), config_path.clone());
		}

		for include in includes {
			let include_path = self.resolve_path(&include)?;
			let content = self.read_file(&include_path).await?;
			let include_toml: toml::Table = toml::from_str(&content)?;

			for (section, value) in include_toml {
				if section == "include" {
					return Err(ConfigError::Validation(format!(
						"Nested includes are not supported ({})",
						include_path.display()
					)));
				}
				if let Some(existing) = self.section_sources.get(&section) {
					return Err(ConfigError::Validation(format!(
						"Duplicate section '{}' found in {} and {}",
						section,
						existing.display(),
						include_path.display()
					)));
				}
				self.section_sources
					.insert(section.clone(), include_path.clone());
				main_toml.insert(section, value);
			}
		}

		let combined = toml::to_string(&main_toml).map_err(|e| {
			ConfigError::Parse(format!("Failed to serialize combined config: {}", e))
		})?;
		combined.parse()
	}

	/// Reads a file once, resolving environment variables.
	async fn read_file(&mut self, path: &Path) -> Result<String, ConfigError> {
		let canonical = tokio::fs::canonicalize(path).await.map_err(|e| {
			ConfigError::Io(std::io::Error::new(
				e.kind(),
				format!("Cannot resolve path {}: {}", path.display(), e),
			))
		})?;

		if !self.loaded_files.insert(canonical.clone()) {
			return Err(ConfigError::Validation(format!(
				"Circular include detected: {} was already loaded",
				canonical.display()
			)));
		}

		let content = tokio::fs::read_to_string(&canonical).await?;
		resolve_env_vars(&content)
	}

	fn resolve_path(&self, path: impl AsRef<Path>) -> Result<PathBuf, ConfigError> {
		let path = path.as_ref();
		let resolved = if path.is_absolute() {
			path.to_path_buf()
		} else {
			self.base_path.join(path)
		};

		if !resolved.exists() {
			return Err(ConfigError::Io(std::io::Error::new(
				std::io::ErrorKind::NotFound,
				format!("Configuration file not found: {}", resolved.display()),
			)));
		}
		Ok(resolved)
	}
}

/// Removes and returns the `include` entry, a string or an array of strings.
fn extract_includes(table: &mut toml::Table) -> Result<Vec<PathBuf>, ConfigError> {
	match table.remove("include") {
		None => Ok(Vec::new()),
		Some(toml::Value::String(path)) => Ok(vec![PathBuf::from(path)]),
		Some(toml::Value::Array(items)) => items
			.into_iter()
			.map(|item| match item {
				toml::Value::String(path) => Ok(PathBuf::from(path)),
				_ => Err(ConfigError::Validation(
					"Include array must contain only strings".into(),
				)),
			})
			.collect(),
		Some(_) => Err(ConfigError::Validation(
			"Include must be a string or array of strings".into(),
		)),
	}
}
