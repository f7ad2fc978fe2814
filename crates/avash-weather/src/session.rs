//! Per-location fetch lifecycle.
//!
//! A `LocationSession` is a pure state machine. It never performs I/O itself:
//! `start` and `apply` return the [`FetchCommand`]s the owner must run, and the
//! owner feeds each completion back in as a [`FetchOutcome`]. One session is
//! one lifecycle; a refresh is a new session with a new generation.

use avash_core::WeatherError;

use crate::types::{Coordinates, ForecastSnapshot, LocationIdentifier, WeatherSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Resolving,
    FetchingWeather,
    Ready,
    Failed,
}

/// How a place-name identifier reaches the weather endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceLookup {
    /// Geocode first, then fetch weather by coordinates.
    Geocode,
    /// Ask the weather endpoints by name directly.
    Direct,
}

/// I/O the owner must perform for a session.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchCommand {
    Resolve(String),
    FetchCurrent(LocationIdentifier),
    FetchForecast(LocationIdentifier),
}

/// Completion of a [`FetchCommand`].
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    Resolved(Result<Coordinates, WeatherError>),
    Current(Result<WeatherSnapshot, WeatherError>),
    Forecast(Result<ForecastSnapshot, WeatherError>),
}

#[derive(Debug, Clone)]
pub struct LocationSession {
    identifier: LocationIdentifier,
    lookup: PlaceLookup,
    generation: u64,
    state: SessionState,
    coordinates: Option<Coordinates>,
    current: Option<WeatherSnapshot>,
    forecast: Option<ForecastSnapshot>,
    forecast_pending: bool,
    forecast_error: Option<WeatherError>,
    error: Option<WeatherError>,
}

impl LocationSession {
    pub fn new(identifier: LocationIdentifier, lookup: PlaceLookup, generation: u64) -> Self {
        Self {
            identifier,
            lookup,
            generation,
            state: SessionState::Idle,
            coordinates: None,
            current: None,
            forecast: None,
            forecast_pending: false,
            forecast_error: None,
            error: None,
        }
    }

    /// Session for a searched place: geocode, then weather.
    pub fn searched(place: &str, generation: u64) -> Self {
        Self::new(LocationIdentifier::place(place), PlaceLookup::Geocode, generation)
    }

    /// Session seeded with known coordinates; skips geocoding.
    pub fn positioned(coordinates: Coordinates, generation: u64) -> Self {
        Self::new(
            LocationIdentifier::Coordinates(coordinates),
            PlaceLookup::Geocode,
            generation,
        )
    }

    /// Session for a favorite, queried by name.
    pub fn favorite(name: &str, generation: u64) -> Self {
        Self::new(LocationIdentifier::Place(name.to_string()), PlaceLookup::Direct, generation)
    }

    /// Fresh lifecycle for the same identifier.
    pub fn restarted(&self, generation: u64) -> Self {
        Self::new(self.identifier.clone(), self.lookup, generation)
    }

    /// Leave `Idle`. Calling this in any other state does nothing.
    pub fn start(&mut self) -> Vec<FetchCommand> {
        if self.state != SessionState::Idle {
            tracing::debug!("Session for {} already started", self.identifier);
            return Vec::new();
        }

        match (&self.identifier, self.lookup) {
            (LocationIdentifier::Place(name), PlaceLookup::Geocode) => {
                self.state = SessionState::Resolving;
                vec![FetchCommand::Resolve(name.clone())]
            }
            (LocationIdentifier::Place(_), PlaceLookup::Direct) => {
                let target = self.identifier.clone();
                self.begin_weather(target)
            }
            (LocationIdentifier::Coordinates(coords), _) => {
                let coords = *coords;
                self.coordinates = Some(coords);
                self.begin_weather(LocationIdentifier::Coordinates(coords))
            }
        }
    }

    /// Feed one completion into the machine.
    pub fn apply(&mut self, outcome: FetchOutcome) -> Vec<FetchCommand> {
        match (self.state, outcome) {
            (SessionState::Resolving, FetchOutcome::Resolved(Ok(coords))) => {
                self.coordinates = Some(coords);
                self.begin_weather(LocationIdentifier::Coordinates(coords))
            }
            (SessionState::Resolving, FetchOutcome::Resolved(Err(e))) => {
                self.fail(e);
                Vec::new()
            }
            (SessionState::FetchingWeather, FetchOutcome::Current(Ok(snapshot))) => {
                if self.coordinates.is_none() {
                    self.coordinates = Some(snapshot.captured_for);
                }
                self.current = Some(snapshot);
                self.state = SessionState::Ready;
                tracing::info!("Weather ready for {}", self.identifier);
                Vec::new()
            }
            (SessionState::FetchingWeather, FetchOutcome::Current(Err(e))) => {
                // Forecast without current weather is not shown.
                self.forecast = None;
                self.forecast_pending = false;
                self.fail(e);
                Vec::new()
            }
            (
                SessionState::FetchingWeather | SessionState::Ready,
                FetchOutcome::Forecast(result),
            ) => {
                self.forecast_pending = false;
                match result {
                    Ok(forecast) => {
                        self.forecast = Some(forecast);
                        self.forecast_error = None;
                    }
                    Err(e) => {
                        tracing::warn!("Forecast for {} unavailable: {}", self.identifier, e);
                        self.forecast = None;
                        self.forecast_error = Some(e);
                    }
                }
                Vec::new()
            }
            (state, outcome) => {
                tracing::debug!(
                    "Ignoring {} for {} in state {:?}",
                    outcome.label(),
                    self.identifier,
                    state
                );
                Vec::new()
            }
        }
    }

    fn begin_weather(&mut self, target: LocationIdentifier) -> Vec<FetchCommand> {
        self.state = SessionState::FetchingWeather;
        self.forecast_pending = true;
        vec![
            FetchCommand::FetchCurrent(target.clone()),
            FetchCommand::FetchForecast(target),
        ]
    }

    fn fail(&mut self, error: WeatherError) {
        tracing::warn!("Session for {} failed: {}", self.identifier, error);
        self.state = SessionState::Failed;
        self.error = Some(error);
    }

    pub fn identifier(&self) -> &LocationIdentifier {
        &self.identifier
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// True while resolving or fetching current weather.
    pub fn loading(&self) -> bool {
        matches!(
            self.state,
            SessionState::Resolving | SessionState::FetchingWeather
        )
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        self.coordinates
    }

    pub fn current(&self) -> Option<&WeatherSnapshot> {
        self.current.as_ref()
    }

    pub fn forecast(&self) -> Option<&ForecastSnapshot> {
        self.forecast.as_ref()
    }

    /// Forecast request still outstanding.
    pub fn forecast_pending(&self) -> bool {
        self.forecast_pending
    }

    /// Why the forecast is missing, if it failed. Not a session failure.
    pub fn forecast_error(&self) -> Option<&WeatherError> {
        self.forecast_error.as_ref()
    }

    pub fn error(&self) -> Option<&WeatherError> {
        self.error.as_ref()
    }

    /// Name to store when this location is favorited.
    ///
    /// Place sessions use their trimmed search text; positioned sessions use
    /// the place name the weather upstream reported, once ready.
    pub fn resolved_name(&self) -> Option<&str> {
        if self.state != SessionState::Ready {
            return None;
        }
        match &self.identifier {
            LocationIdentifier::Place(name) => Some(name),
            LocationIdentifier::Coordinates(_) => {
                self.current.as_ref().and_then(|c| c.place_name.as_deref())
            }
        }
    }
}

impl FetchOutcome {
    fn label(&self) -> &'static str {
        match self {
            FetchOutcome::Resolved(_) => "geocode result",
            FetchOutcome::Current(_) => "current weather",
            FetchOutcome::Forecast(_) => "forecast",
        }
    }
}
