//! Integration tests for GeocodeResolver and WeatherFetcher using wiremock.

mod common;

use std::sync::Arc;
use std::time::Duration;

use avash_core::{HttpTransport, WeatherError};
use avash_weather::{ApiEndpoint, GeocodeResolver, LocationIdentifier, WeatherFetcher};
use chrono::{TimeZone, Utc};
use common::*;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn endpoint(server: &MockServer) -> ApiEndpoint {
    ApiEndpoint::new(&server.uri(), "test-key").unwrap()
}

fn resolver(server: &MockServer) -> GeocodeResolver {
    let transport = HttpTransport::new(Duration::from_secs(5)).unwrap();
    GeocodeResolver::new(Arc::new(transport), endpoint(server), 5)
}

fn fetcher(server: &MockServer) -> WeatherFetcher {
    let transport = HttpTransport::new(Duration::from_secs(5)).unwrap();
    WeatherFetcher::new(Arc::new(transport), endpoint(server))
}

#[tokio::test]
async fn test_resolve_returns_first_match() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(GEOCODE_PATH))
        .and(query_param("q", "Paris"))
        .and(query_param("limit", "5"))
        .and(query_param("appid", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "name": "Paris", "lat": 48.8566, "lon": 2.3522, "country": "FR" },
            { "name": "Paris", "lat": 33.6609, "lon": -95.5555, "country": "US", "state": "Texas" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let coords = resolver(&server).resolve("Paris").await.unwrap();

    assert_eq!(coords, paris());
    server.verify().await;
}

#[tokio::test]
async fn test_lookup_keeps_all_matches_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(GEOCODE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "name": "Springfield", "lat": 39.78, "lon": -89.65, "state": "Illinois" },
            { "name": "Springfield", "lat": 37.21, "lon": -93.29, "state": "Missouri" }
        ])))
        .mount(&server)
        .await;

    let matches = resolver(&server).lookup("Springfield").await.unwrap();

    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0].state.as_deref(), Some("Illinois"));
    assert_eq!(matches[1].state.as_deref(), Some("Missouri"));
    assert!(matches[1].country.is_none());
}

#[tokio::test]
async fn test_resolve_no_matches_is_location_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(GEOCODE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    let err = resolver(&server).resolve("Atlantis").await.unwrap_err();

    assert_eq!(err, WeatherError::LocationNotFound("Atlantis".to_string()));
}

#[tokio::test]
async fn test_resolve_server_error_is_geocode_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(GEOCODE_PATH))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = resolver(&server).resolve("Paris").await.unwrap_err();

    assert!(matches!(err, WeatherError::GeocodeUnavailable(_)));
}

#[tokio::test]
async fn test_resolve_malformed_body_is_geocode_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(GEOCODE_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "cod": 401 })),
        )
        .mount(&server)
        .await;

    let err = resolver(&server).resolve("Paris").await.unwrap_err();

    assert!(matches!(err, WeatherError::GeocodeUnavailable(_)));
}

#[tokio::test]
async fn test_current_by_coordinates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CURRENT_PATH))
        .and(query_param("lat", "48.8566"))
        .and(query_param("lon", "2.3522"))
        .and(query_param("units", "metric"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(current_body("Paris", paris(), 18.3)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let snapshot = fetcher(&server)
        .get_current(&LocationIdentifier::Coordinates(paris()))
        .await
        .unwrap();

    assert_eq!(snapshot.temperature_celsius, 18.3);
    assert_eq!(snapshot.humidity_percent, 64);
    assert_eq!(snapshot.wind_speed, 4.1);
    assert_eq!(snapshot.description, "scattered clouds");
    assert_eq!(snapshot.icon_code, "03d");
    assert_eq!(snapshot.captured_for, paris());
    assert_eq!(snapshot.place_name.as_deref(), Some("Paris"));
    assert_eq!(snapshot.icon_url(), "https://openweathermap.org/img/w/03d.png");
    server.verify().await;
}

#[tokio::test]
async fn test_current_by_name_records_upstream_coordinates() {
    let server = MockServer::start().await;
    mount_weather_named(&server, "Tokyo", tokyo(), 21.0).await;

    let snapshot = fetcher(&server)
        .get_current(&LocationIdentifier::Place("Tokyo".to_string()))
        .await
        .unwrap();

    assert_eq!(snapshot.captured_for, tokyo());
}

#[tokio::test]
async fn test_current_empty_station_name_is_none() {
    let server = MockServer::start().await;
    mount_weather_at(&server, "", nairobi(), 25.0).await;

    let snapshot = fetcher(&server)
        .get_current(&LocationIdentifier::Coordinates(nairobi()))
        .await
        .unwrap();

    assert!(snapshot.place_name.is_none());
}

#[tokio::test]
async fn test_current_without_conditions_is_weather_unavailable() {
    let server = MockServer::start().await;
    let mut body = current_body("Paris", paris(), 18.0);
    body["weather"] = serde_json::json!([]);
    Mock::given(method("GET"))
        .and(path(CURRENT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let err = fetcher(&server)
        .get_current(&LocationIdentifier::Coordinates(paris()))
        .await
        .unwrap_err();

    assert!(matches!(err, WeatherError::WeatherUnavailable(_)));
}

#[tokio::test]
async fn test_current_not_found_is_weather_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CURRENT_PATH))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "cod": "404",
            "message": "city not found"
        })))
        .mount(&server)
        .await;

    let err = fetcher(&server)
        .get_current(&LocationIdentifier::Place("Atlantis".to_string()))
        .await
        .unwrap_err();

    match err {
        WeatherError::WeatherUnavailable(message) => assert!(message.contains("404")),
        other => panic!("expected WeatherUnavailable, got {other:?}"),
    }
}

#[tokio::test]
async fn test_forecast_entries_in_order() {
    let server = MockServer::start().await;
    mount_weather_at(&server, "Paris", paris(), 18.0).await;

    let forecast = fetcher(&server)
        .get_forecast(&LocationIdentifier::Coordinates(paris()))
        .await
        .unwrap();

    assert_eq!(forecast.location_name.as_deref(), Some("Paris"));
    assert_eq!(forecast.len(), 2);

    let first = forecast.first().unwrap();
    assert_eq!(first.time, Utc.with_ymd_and_hms(2026, 10, 18, 15, 0, 0).unwrap());
    assert_eq!(first.conditions.temperature_celsius, 17.5);
    assert_eq!(first.conditions.icon_code, "10d");
    assert_eq!(first.conditions.captured_for, paris());
    assert!(forecast.entries[0].time < forecast.entries[1].time);
}

#[tokio::test]
async fn test_forecast_by_name_uses_city_coordinates() {
    let server = MockServer::start().await;
    mount_weather_named(&server, "Nairobi", nairobi(), 24.0).await;

    let forecast = fetcher(&server)
        .get_forecast(&LocationIdentifier::Place("Nairobi".to_string()))
        .await
        .unwrap();

    assert!(forecast
        .entries
        .iter()
        .all(|entry| entry.conditions.captured_for == nairobi()));
}

#[tokio::test]
async fn test_forecast_missing_list_is_weather_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(FORECAST_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "cod": "200" })))
        .mount(&server)
        .await;

    let err = fetcher(&server)
        .get_forecast(&LocationIdentifier::Coordinates(paris()))
        .await
        .unwrap_err();

    assert!(matches!(err, WeatherError::WeatherUnavailable(_)));
}
