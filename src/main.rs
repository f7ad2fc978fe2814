use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use avash_core::{Config, HttpTransport, KeyValueStore, MemoryStore, SqliteStore};
use avash_weather::{AppController, Capabilities, ConfiguredPosition, LocationSession};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize core
    avash_core::init()?;

    let (config, _validation) = Config::load_validated()?;

    let transport = HttpTransport::new(Duration::from_secs(config.weather.request_timeout_secs))
        .context("Failed to build HTTP client")?;

    let mut controller = AppController::new(
        &config.weather,
        Capabilities {
            transport: Arc::new(transport),
            store: open_store(&config),
            sensor: Arc::new(ConfiguredPosition::from_config(&config.location)),
        },
        tokio::runtime::Handle::current(),
    )?;

    controller.init();
    controller.use_current_position();
    controller.settle().await;

    tracing::info!("Avash started");
    if let Some(e) = controller.geolocation_error() {
        tracing::info!("{}", e.user_message());
    }
    if let Some(primary) = controller.primary() {
        log_session(&controller, "Current location", primary);
    }
    for session in controller.favorite_sessions() {
        log_session(&controller, "Favorite", session);
    }

    Ok(())
}

/// Favorites live in SQLite under the config directory. If that cannot be
/// opened the run continues with an in-memory store.
fn open_store(config: &Config) -> Arc<dyn KeyValueStore> {
    if let Err(e) = std::fs::create_dir_all(&config.config_dir) {
        tracing::warn!("Failed to create config directory: {}", e);
    }

    let path = config.database_path();
    match SqliteStore::open(&path) {
        Ok(store) => {
            tracing::info!("Favorites database: {}", path.display());
            Arc::new(store)
        }
        Err(e) => {
            tracing::error!("Failed to open favorites database, favorites will not persist: {}", e);
            Arc::new(MemoryStore::new())
        }
    }
}

fn log_session(controller: &AppController, label: &str, session: &LocationSession) {
    if let Some(error) = session.error() {
        tracing::info!("{} {}: {}", label, session.identifier(), error.user_message());
        return;
    }

    let Some(current) = session.current() else {
        tracing::info!("{} {}: no data", label, session.identifier());
        return;
    };

    tracing::info!(
        "{} {}: {} {}, humidity {}%, wind {} m/s",
        label,
        current.place_name.as_deref().unwrap_or("unnamed"),
        controller.temperature_label(current),
        current.description,
        current.humidity_percent,
        current.wind_speed
    );

    if let Some(first) = session.forecast().and_then(|forecast| forecast.first()) {
        tracing::info!(
            "  next {}: {} {}",
            first.time.format("%a %H:%M UTC"),
            controller.temperature_label(&first.conditions),
            first.conditions.description
        );
    }
}
