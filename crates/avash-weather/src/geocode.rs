//! Forward geocoding: turn a place name into coordinates.
//! Uses the OpenWeatherMap direct geocoding endpoint.

use std::sync::Arc;

use avash_core::{JsonTransport, WeatherError};
use serde::Deserialize;

use crate::endpoint::ApiEndpoint;
use crate::types::Coordinates;

const DIRECT_GEOCODE_PATH: &str = "geo/1.0/direct";

/// One candidate returned by the geocoder, best match first.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeMatch {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub country: Option<String>,
    pub state: Option<String>,
}

impl GeocodeMatch {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lon)
    }
}

/// Resolves free-text place names. Never retries; that is the caller's call.
#[derive(Clone)]
pub struct GeocodeResolver {
    transport: Arc<dyn JsonTransport>,
    endpoint: ApiEndpoint,
    limit: u8,
}

impl GeocodeResolver {
    pub fn new(transport: Arc<dyn JsonTransport>, endpoint: ApiEndpoint, limit: u8) -> Self {
        Self {
            transport,
            endpoint,
            limit: limit.max(1),
        }
    }

    /// All matches for `place`, in upstream order. An empty list is not an error.
    pub async fn lookup(&self, place: &str) -> Result<Vec<GeocodeMatch>, WeatherError> {
        let url = self
            .endpoint
            .url(
                DIRECT_GEOCODE_PATH,
                &[("q", place.to_string()), ("limit", self.limit.to_string())],
            )
            .map_err(|e| WeatherError::GeocodeUnavailable(e.to_string()))?;

        let body = self.transport.get_json(&url).await.map_err(|e| {
            tracing::warn!("Geocode request for {:?} failed: {}", place, e);
            WeatherError::GeocodeUnavailable(e.to_string())
        })?;

        serde_json::from_value(body).map_err(|e| {
            tracing::warn!("Geocode response for {:?} malformed: {}", place, e);
            WeatherError::GeocodeUnavailable(format!("malformed response: {}", e))
        })
    }

    /// Coordinates of the best match for `place`.
    pub async fn resolve(&self, place: &str) -> Result<Coordinates, WeatherError> {
        let best = self
            .lookup(place)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| WeatherError::LocationNotFound(place.to_string()))?;

        tracing::info!(
            "Geocoded {:?} to {} ({})",
            place,
            best.name,
            best.coordinates()
        );
        Ok(best.coordinates())
    }
}
