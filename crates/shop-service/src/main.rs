//! Main entry point for the storefront order service.
//!
//! Loads the configuration, builds the shop engine with the configured
//! storage backend and serves the order API next to the engine loop.

use clap::Parser;
use shop_config::Config;
use shop_core::{ShopBuilder, ShopEngine, ShopFactories};
use std::path::PathBuf;
use std::sync::Arc;

mod apis;
mod server;

use shop_storage::implementations::file::create_storage as create_file_storage;
use shop_storage::implementations::memory::create_storage as create_memory_storage;

/// Command-line arguments for the shop service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, env = "SHOP_CONFIG", default_value = "config/shop.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	use tracing_subscriber::{fmt, EnvFilter};

	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

	fmt()
		.with_env_filter(env_filter)
		.with_thread_ids(true)
		.with_target(true)
		.init();

	tracing::info!("Started shop");

	let config_path = args
		.config
		.to_str()
		.ok_or("Configuration path is not valid UTF-8")?;
	let config = Config::from_file(config_path).await?;
	tracing::info!("Loaded configuration [{}]", config.shop.id);

	let engine = Arc::new(build_shop(config.clone())?);

	match config.api.filter(|api| api.enabled) {
		Some(api_config) => {
			let api_engine = Arc::clone(&engine);

			tokio::select! {
				result = engine.run() => {
					tracing::info!("Shop engine finished");
					result?;
				}
				result = server::start_server(api_config, api_engine) => {
					tracing::info!("API server finished");
					result?;
				}
			}
		},
		None => {
			tracing::info!("Starting engine only");
			engine.run().await?;
		},
	}

	tracing::info!("Stopped shop");
	Ok(())
}

/// Macro to create a factory HashMap with the appropriate type aliases
macro_rules! create_factory_map {
    ($interface:path, $error:path, $( $name:literal => $factory:expr ),* $(,)?) => {{
        let mut factories = std::collections::HashMap::new();
        $(
            factories.insert(
                $name.to_string(),
                $factory as fn(&toml::Value) -> Result<Box<dyn $interface>, $error>
            );
        )*
        factories
    }};
}

/// Builds the shop engine with the available storage backends.
fn build_shop(config: Config) -> Result<ShopEngine, Box<dyn std::error::Error>> {
	let storage_factories = create_factory_map!(
		shop_storage::StorageInterface,
		shop_storage::StorageError,
		"file" => create_file_storage,
		"memory" => create_memory_storage,
	);

	Ok(ShopBuilder::new(config).build(ShopFactories { storage_factories })?)
}
