//! One-shot device position capability.

use async_trait::async_trait;
use avash_core::{LocationConfig, WeatherError};

use crate::types::Coordinates;

/// Asynchronously yields the device position, or `PositionUnavailable`.
#[async_trait]
pub trait PositionSensor: Send + Sync {
    async fn current_position(&self) -> Result<Coordinates, WeatherError>;
}

/// Position taken from configuration. There is no portable OS location API,
/// so this stands in for the sensor on desktop builds.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredPosition {
    position: Option<Coordinates>,
}

impl ConfiguredPosition {
    pub fn new(position: Option<Coordinates>) -> Self {
        Self { position }
    }

    pub fn from_config(config: &LocationConfig) -> Self {
        Self::new(
            config
                .position()
                .map(|(lat, lon)| Coordinates::new(lat, lon)),
        )
    }
}

#[async_trait]
impl PositionSensor for ConfiguredPosition {
    async fn current_position(&self) -> Result<Coordinates, WeatherError> {
        self.position.ok_or_else(|| {
            WeatherError::PositionUnavailable("no location configured".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_configured_position_is_returned() {
        let config = LocationConfig {
            latitude: Some(-1.2921),
            longitude: Some(36.8219),
        };
        let sensor = ConfiguredPosition::from_config(&config);

        let coords = sensor.current_position().await.unwrap();
        assert_eq!(coords, Coordinates::new(-1.2921, 36.8219));
    }

    #[tokio::test]
    async fn test_missing_position_is_unavailable() {
        let sensor = ConfiguredPosition::default();
        let err = sensor.current_position().await.unwrap_err();
        assert!(matches!(err, WeatherError::PositionUnavailable(_)));
    }
}
