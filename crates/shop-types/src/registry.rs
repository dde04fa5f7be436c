//! Registry trait for self-registering implementations.

/// Base trait for implementation registries.
///
/// Each pluggable backend module provides a `Registry` struct implementing
/// this trait, pairing the name used under `implementations` in the TOML
/// configuration with the factory that builds it.
pub trait ImplementationRegistry {
	/// Configuration name, e.g. "memory" for `storage.implementations.memory`.
	const NAME: &'static str;

	/// The factory function type this implementation provides.
	type Factory;

	/// Get the factory function for this implementation.
	fn factory() -> Self::Factory;
}
