pub mod config;
pub mod error;
pub mod http;
pub mod storage;

pub use config::{Config, API_KEY_ENV, LocationConfig, StorageConfig, TemperatureUnit, WeatherConfig};
pub use error::{ConfigError, DatabaseError, NetworkError, WeatherError};
pub use http::{HttpTransport, JsonTransport};
pub use storage::{KeyValueStore, MemoryStore, SqliteStore};

use anyhow::Result;

/// Initialize the core application
pub fn init() -> Result<()> {
    // Initialize tracing/logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Avash core initialized");
    Ok(())
}
