//! Weather core for Avash
//!
//! Resolves places, fetches current conditions and forecasts from an
//! OpenWeatherMap-compatible API, and keeps a persisted list of favorite
//! places refreshed alongside the searched or device location.

pub mod types;
pub mod controller;
pub mod endpoint;
pub mod favorites;
pub mod geocode;
pub mod location;
pub mod provider;
pub mod session;

pub use types::*;
pub use controller::{AppController, Capabilities, SessionKey};
pub use endpoint::ApiEndpoint;
pub use favorites::{FavoritesStore, FAVORITES_KEY};
pub use geocode::{GeocodeMatch, GeocodeResolver};
pub use location::{ConfiguredPosition, PositionSensor};
pub use provider::WeatherFetcher;
pub use session::{FetchCommand, FetchOutcome, LocationSession, PlaceLookup, SessionState};
