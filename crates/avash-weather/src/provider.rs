use std::sync::Arc;

use avash_core::{JsonTransport, WeatherError};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::endpoint::ApiEndpoint;
use crate::types::{Coordinates, ForecastEntry, ForecastSnapshot, LocationIdentifier, WeatherSnapshot};

const CURRENT_PATH: &str = "data/2.5/weather";
const FORECAST_PATH: &str = "data/2.5/forecast";

#[derive(Debug, Deserialize)]
struct CoordPayload {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct ConditionPayload {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct MainPayload {
    temp: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct WindPayload {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct CurrentPayload {
    coord: CoordPayload,
    weather: Vec<ConditionPayload>,
    main: MainPayload,
    wind: WindPayload,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ForecastItemPayload {
    dt: i64,
    weather: Vec<ConditionPayload>,
    main: MainPayload,
    wind: WindPayload,
}

#[derive(Debug, Deserialize)]
struct CityPayload {
    name: Option<String>,
    coord: Option<CoordPayload>,
}

#[derive(Debug, Deserialize)]
struct ForecastPayload {
    list: Vec<ForecastItemPayload>,
    city: Option<CityPayload>,
}

fn malformed(what: &str) -> WeatherError {
    WeatherError::WeatherUnavailable(format!("malformed response: {}", what))
}

fn non_empty(name: Option<String>) -> Option<String> {
    name.filter(|n| !n.trim().is_empty())
}

fn build_snapshot(
    main: MainPayload,
    wind: WindPayload,
    weather: Vec<ConditionPayload>,
    captured_for: Coordinates,
    place_name: Option<String>,
) -> Result<WeatherSnapshot, WeatherError> {
    let condition = weather
        .into_iter()
        .next()
        .ok_or_else(|| malformed("missing weather condition"))?;

    Ok(WeatherSnapshot {
        temperature_celsius: main.temp,
        humidity_percent: main.humidity,
        wind_speed: wind.speed,
        description: condition.description,
        icon_code: condition.icon,
        captured_for,
        place_name,
    })
}

/// Fetches current conditions and forecasts. Both calls are independent:
/// a failed forecast never affects a current-weather result.
#[derive(Clone)]
pub struct WeatherFetcher {
    transport: Arc<dyn JsonTransport>,
    endpoint: ApiEndpoint,
}

impl WeatherFetcher {
    pub fn new(transport: Arc<dyn JsonTransport>, endpoint: ApiEndpoint) -> Self {
        Self {
            transport,
            endpoint,
        }
    }

    /// Current conditions. Coordinates requested by position are recorded
    /// exactly as asked; by place name, as the upstream reports them.
    pub async fn get_current(
        &self,
        target: &LocationIdentifier,
    ) -> Result<WeatherSnapshot, WeatherError> {
        let payload: CurrentPayload = self.fetch(CURRENT_PATH, target).await?;

        let captured_for = match target {
            LocationIdentifier::Coordinates(coords) => *coords,
            LocationIdentifier::Place(_) => {
                Coordinates::new(payload.coord.lat, payload.coord.lon)
            }
        };

        let snapshot = build_snapshot(
            payload.main,
            payload.wind,
            payload.weather,
            captured_for,
            non_empty(payload.name),
        )?;

        tracing::debug!(
            "Current weather for {}: {:.1}°C, {}",
            target,
            snapshot.temperature_celsius,
            snapshot.description
        );
        Ok(snapshot)
    }

    /// Forecast window, ordered as the upstream returns it (earliest first).
    pub async fn get_forecast(
        &self,
        target: &LocationIdentifier,
    ) -> Result<ForecastSnapshot, WeatherError> {
        let payload: ForecastPayload = self.fetch(FORECAST_PATH, target).await?;

        let (city_name, city_coords) = match payload.city {
            Some(city) => (
                non_empty(city.name),
                city.coord.map(|c| Coordinates::new(c.lat, c.lon)),
            ),
            None => (None, None),
        };

        let captured_for = match target {
            LocationIdentifier::Coordinates(coords) => *coords,
            LocationIdentifier::Place(_) => {
                city_coords.ok_or_else(|| malformed("missing city coordinates"))?
            }
        };

        let entries = payload
            .list
            .into_iter()
            .map(|item| -> Result<ForecastEntry, WeatherError> {
                let time: DateTime<Utc> = DateTime::from_timestamp(item.dt, 0)
                    .ok_or_else(|| malformed("forecast timestamp out of range"))?;
                let conditions = build_snapshot(
                    item.main,
                    item.wind,
                    item.weather,
                    captured_for,
                    city_name.clone(),
                )?;
                Ok(ForecastEntry { time, conditions })
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!("Forecast for {}: {} entries", target, entries.len());
        Ok(ForecastSnapshot {
            location_name: city_name,
            entries,
        })
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        path: &str,
        target: &LocationIdentifier,
    ) -> Result<T, WeatherError> {
        let mut params = match target {
            LocationIdentifier::Coordinates(coords) => vec![
                ("lat", coords.latitude.to_string()),
                ("lon", coords.longitude.to_string()),
            ],
            LocationIdentifier::Place(name) => vec![("q", name.clone())],
        };
        // Always metric; conversion happens at display time.
        params.push(("units", "metric".to_string()));

        let url = self
            .endpoint
            .url(path, &params)
            .map_err(|e| WeatherError::WeatherUnavailable(e.to_string()))?;

        let body = self.transport.get_json(&url).await.map_err(|e| {
            tracing::warn!("Weather request for {} failed: {}", target, e);
            WeatherError::WeatherUnavailable(e.to_string())
        })?;

        serde_json::from_value(body).map_err(|e| {
            tracing::warn!("Weather response for {} malformed: {}", target, e);
            malformed(&e.to_string())
        })
    }
}
