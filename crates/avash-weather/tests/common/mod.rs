//! Shared fixtures for weather integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use avash_core::{HttpTransport, KeyValueStore, WeatherConfig, WeatherError};
use avash_weather::{AppController, Capabilities, ConfiguredPosition, Coordinates, PositionSensor};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const GEOCODE_PATH: &str = "/geo/1.0/direct";
pub const CURRENT_PATH: &str = "/data/2.5/weather";
pub const FORECAST_PATH: &str = "/data/2.5/forecast";

pub fn paris() -> Coordinates {
    Coordinates::new(48.8566, 2.3522)
}

pub fn tokyo() -> Coordinates {
    Coordinates::new(35.6762, 139.6503)
}

pub fn nairobi() -> Coordinates {
    Coordinates::new(-1.2921, 36.8219)
}

pub fn geocode_body(name: &str, coords: Coordinates) -> serde_json::Value {
    serde_json::json!([
        {
            "name": name,
            "lat": coords.latitude,
            "lon": coords.longitude,
            "country": "XX",
            "local_names": { "en": name }
        }
    ])
}

pub fn current_body(name: &str, coords: Coordinates, temp: f64) -> serde_json::Value {
    serde_json::json!({
        "coord": { "lon": coords.longitude, "lat": coords.latitude },
        "weather": [
            { "id": 802, "main": "Clouds", "description": "scattered clouds", "icon": "03d" }
        ],
        "base": "stations",
        "main": { "temp": temp, "feels_like": temp - 1.0, "pressure": 1012, "humidity": 64 },
        "wind": { "speed": 4.1, "deg": 250 },
        "dt": 1_792_324_800,
        "name": name
    })
}

pub fn forecast_body(name: &str, coords: Coordinates) -> serde_json::Value {
    serde_json::json!({
        "cod": "200",
        "cnt": 2,
        "list": [
            {
                "dt": 1_792_335_600,
                "main": { "temp": 17.5, "humidity": 70 },
                "weather": [ { "description": "light rain", "icon": "10d" } ],
                "wind": { "speed": 5.2 },
                "dt_txt": "2026-10-18 15:00:00"
            },
            {
                "dt": 1_792_346_400,
                "main": { "temp": 14.0, "humidity": 78 },
                "weather": [ { "description": "overcast clouds", "icon": "04n" } ],
                "wind": { "speed": 3.0 },
                "dt_txt": "2026-10-18 18:00:00"
            }
        ],
        "city": {
            "name": name,
            "coord": { "lat": coords.latitude, "lon": coords.longitude },
            "country": "XX"
        }
    })
}

/// Geocode `place` to `coords`.
pub async fn mount_geocode(server: &MockServer, place: &str, coords: Coordinates) {
    Mock::given(method("GET"))
        .and(path(GEOCODE_PATH))
        .and(query_param("q", place))
        .respond_with(ResponseTemplate::new(200).set_body_json(geocode_body(place, coords)))
        .mount(server)
        .await;
}

/// Current weather and forecast answered for requests by position.
pub async fn mount_weather_at(server: &MockServer, name: &str, coords: Coordinates, temp: f64) {
    let lat = coords.latitude.to_string();
    Mock::given(method("GET"))
        .and(path(CURRENT_PATH))
        .and(query_param("lat", lat.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body(name, coords, temp)))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(FORECAST_PATH))
        .and(query_param("lat", lat.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(name, coords)))
        .mount(server)
        .await;
}

/// Current weather and forecast answered for requests by place name.
pub async fn mount_weather_named(server: &MockServer, name: &str, coords: Coordinates, temp: f64) {
    Mock::given(method("GET"))
        .and(path(CURRENT_PATH))
        .and(query_param("q", name))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body(name, coords, temp)))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(FORECAST_PATH))
        .and(query_param("q", name))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(name, coords)))
        .mount(server)
        .await;
}

pub fn weather_config(server: &MockServer) -> WeatherConfig {
    WeatherConfig {
        api_base_url: server.uri(),
        api_key: "test-key".to_string(),
        ..WeatherConfig::default()
    }
}

pub fn controller(
    server: &MockServer,
    store: Arc<dyn KeyValueStore>,
    sensor: Arc<dyn PositionSensor>,
) -> AppController {
    let transport = HttpTransport::new(Duration::from_secs(5)).unwrap();
    AppController::new(
        &weather_config(server),
        Capabilities {
            transport: Arc::new(transport),
            store,
            sensor,
        },
        tokio::runtime::Handle::current(),
    )
    .unwrap()
}

pub fn no_position() -> Arc<dyn PositionSensor> {
    Arc::new(ConfiguredPosition::default())
}

/// Sensor that answers after a delay.
pub struct SlowSensor {
    pub position: Coordinates,
    pub delay: Duration,
}

#[async_trait]
impl PositionSensor for SlowSensor {
    async fn current_position(&self) -> Result<Coordinates, WeatherError> {
        tokio::time::sleep(self.delay).await;
        Ok(self.position)
    }
}
