//! Validation of backend-specific TOML tables.
//!
//! Pluggable backends receive their raw `[*.implementations.<name>]` table.
//! Each backend describes the keys it understands with a [`Schema`] and
//! validates the table before building itself.

use thiserror::Error;

/// Errors that can occur during configuration validation.
#[derive(Debug, Error)]
pub enum ValidationError {
	/// Error that occurs when a required field is missing.
	#[error("Missing required field: {0}")]
	MissingField(String),
	/// Error that occurs when a field has an invalid value.
	#[error("Invalid value for field '{field}': {message}")]
	InvalidValue { field: String, message: String },
	/// Error that occurs when field type is incorrect.
	#[error("Type mismatch for field '{field}': expected {expected}, got {actual}")]
	TypeMismatch {
		field: String,
		expected: String,
		actual: String,
	},
	/// A key that no field of the schema describes.
	#[error("Unknown field: {0}")]
	UnknownField(String),
}

/// Expected type of a configuration field.
#[derive(Debug)]
pub enum FieldType {
	String,
	/// An integer with optional inclusive bounds.
	Integer { min: Option<i64>, max: Option<i64> },
	Boolean,
}

/// A named field of a [`Schema`].
#[derive(Debug)]
pub struct Field {
	pub name: String,
	pub field_type: FieldType,
}

impl Field {
	/// Creates a new field with the given name and type.
	pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
		Self {
			name: name.into(),
			field_type,
		}
	}
}

/// Required and optional keys of a backend table.
///
/// Keys not listed in either set are rejected, so typos in configuration
/// files fail at startup instead of being ignored.
#[derive(Debug)]
pub struct Schema {
	pub required: Vec<Field>,
	pub optional: Vec<Field>,
}

impl Schema {
	/// Creates a new schema with required and optional fields.
	pub fn new(required: Vec<Field>, optional: Vec<Field>) -> Self {
		Self { required, optional }
	}

	/// Validates a TOML value against this schema.
	///
	/// # Errors
	///
	/// Returns an error if the value is not a table, a required field is
	/// missing, a field has the wrong type or is out of bounds, or the table
	/// carries a key the schema does not know.
	pub fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let table = config
			.as_table()
			.ok_or_else(|| ValidationError::TypeMismatch {
				field: "root".to_string(),
				expected: "table".to_string(),
				actual: config.type_str().to_string(),
			})?;

		for field in &self.required {
			let value = table
				.get(&field.name)
				.ok_or_else(|| ValidationError::MissingField(field.name.clone()))?;
			validate_field_type(&field.name, value, &field.field_type)?;
		}

		for field in &self.optional {
			if let Some(value) = table.get(&field.name) {
				validate_field_type(&field.name, value, &field.field_type)?;
			}
		}

		for key in table.keys() {
			let known = self
				.required
				.iter()
				.chain(self.optional.iter())
				.any(|field| &field.name == key);
			if !known {
				return Err(ValidationError::UnknownField(key.clone()));
			}
		}

		Ok(())
	}
}

fn type_mismatch(field_name: &str, expected: &str, value: &toml::Value) -> ValidationError {
	ValidationError::TypeMismatch {
		field: field_name.to_string(),
		expected: expected.to_string(),
		actual: value.type_str().to_string(),
	}
}

fn validate_field_type(
	field_name: &str,
	value: &toml::Value,
	expected_type: &FieldType,
) -> Result<(), ValidationError> {
	match expected_type {
		FieldType::String => {
			if !value.is_str() {
				return Err(type_mismatch(field_name, "string", value));
			}
		},
		FieldType::Integer { min, max } => {
			let int_val = value
				.as_integer()
				.ok_or_else(|| type_mismatch(field_name, "integer", value))?;

			if let Some(min_val) = min {
				if int_val < *min_val {
					return Err(ValidationError::InvalidValue {
						field: field_name.to_string(),
						message: format!("Value {} is less than minimum {}", int_val, min_val),
					});
				}
			}
			if let Some(max_val) = max {
				if int_val > *max_val {
					return Err(ValidationError::InvalidValue {
						field: field_name.to_string(),
						message: format!("Value {} is greater than maximum {}", int_val, max_val),
					});
				}
			}
		},
		FieldType::Boolean => {
			if !value.is_bool() {
				return Err(type_mismatch(field_name, "boolean", value));
			}
		},
	}

	Ok(())
}

/// A configuration schema implemented by each pluggable backend.
pub trait ConfigSchema: Send + Sync {
	/// Validates a TOML configuration value against this schema.
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError>;
}

#[cfg(test)]
mod tests {
	use super::*;

	fn schema() -> Schema {
		Schema::new(
			vec![Field::new("storage_path", FieldType::String)],
			vec![Field::new(
				"ttl_orders",
				FieldType::Integer {
					min: Some(0),
					max: None,
				},
			)],
		)
	}

	#[test]
	fn test_valid_table() {
		let value: toml::Value = toml::from_str("storage_path = \"./data\"\nttl_orders = 60").unwrap();
		assert!(schema().validate(&value).is_ok());
	}

	#[test]
	fn test_missing_required_field() {
		let value: toml::Value = toml::from_str("ttl_orders = 60").unwrap();
		assert!(matches!(
			schema().validate(&value),
			Err(ValidationError::MissingField(f)) if f == "storage_path"
		));
	}

	#[test]
	fn test_integer_bounds() {
		let value: toml::Value =
			toml::from_str("storage_path = \"./data\"\nttl_orders = -1").unwrap();
		assert!(matches!(
			schema().validate(&value),
			Err(ValidationError::InvalidValue { .. })
		));
	}

	#[test]
	fn test_type_mismatch() {
		let value: toml::Value = toml::from_str("storage_path = 5").unwrap();
		assert!(matches!(
			schema().validate(&value),
			Err(ValidationError::TypeMismatch { .. })
		));
	}

	#[test]
	fn test_unknown_field_is_rejected() {
		let value: toml::Value =
			toml::from_str("storage_path = \"./data\"\nttl_order = 60").unwrap();
		assert!(matches!(
			schema().validate(&value),
			Err(ValidationError::UnknownField(f)) if f == "ttl_order"
		));
	}
}
