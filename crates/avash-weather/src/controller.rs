//! Application-level coordination of weather sessions.
//!
//! `AppController` owns the primary session (search or device position), one
//! session per favorite, and the unit preference. Network work runs on the
//! tokio runtime; every completion comes back as an event on an mpsc channel
//! and is applied here, on the caller's side, by `process_pending`,
//! `next_event` or `settle`. Each event carries the generation of the session
//! that asked for it, and results for a superseded or removed session are
//! dropped instead of applied.

use std::sync::Arc;

use avash_core::{
    ConfigError, DatabaseError, JsonTransport, KeyValueStore, TemperatureUnit, WeatherConfig,
    WeatherError,
};
use tokio::runtime::Handle;
use tokio::sync::mpsc;

use crate::endpoint::ApiEndpoint;
use crate::favorites::FavoritesStore;
use crate::geocode::GeocodeResolver;
use crate::location::PositionSensor;
use crate::provider::WeatherFetcher;
use crate::session::{FetchCommand, FetchOutcome, LocationSession};
use crate::types::{display_temperature, Coordinates, WeatherSnapshot};

/// Which session an event belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SessionKey {
    Primary,
    Favorite(String),
}

#[derive(Debug)]
enum ControllerEvent {
    Fetch {
        key: SessionKey,
        generation: u64,
        outcome: FetchOutcome,
    },
    Position {
        generation: u64,
        result: Result<Coordinates, WeatherError>,
    },
}

/// External collaborators the controller drives.
pub struct Capabilities {
    pub transport: Arc<dyn JsonTransport>,
    pub store: Arc<dyn KeyValueStore>,
    pub sensor: Arc<dyn PositionSensor>,
}

pub struct AppController {
    geocoder: GeocodeResolver,
    fetcher: WeatherFetcher,
    sensor: Arc<dyn PositionSensor>,
    favorites: FavoritesStore,
    primary: Option<LocationSession>,
    favorite_sessions: Vec<LocationSession>,
    unit: TemperatureUnit,
    search_error: Option<WeatherError>,
    geolocation_error: Option<WeatherError>,
    geolocation_requested: bool,
    /// Generation of the latest action that claimed the primary slot.
    primary_claim: u64,
    next_generation: u64,
    in_flight: usize,
    runtime: Handle,
    tx: mpsc::UnboundedSender<ControllerEvent>,
    rx: mpsc::UnboundedReceiver<ControllerEvent>,
}

impl AppController {
    pub fn new(
        config: &WeatherConfig,
        capabilities: Capabilities,
        runtime: Handle,
    ) -> Result<Self, ConfigError> {
        let endpoint = ApiEndpoint::from_config(config)?;
        let geocoder = GeocodeResolver::new(
            capabilities.transport.clone(),
            endpoint.clone(),
            config.geocode_limit,
        );
        let fetcher = WeatherFetcher::new(capabilities.transport, endpoint);
        let (tx, rx) = mpsc::unbounded_channel();

        Ok(Self {
            geocoder,
            fetcher,
            sensor: capabilities.sensor,
            favorites: FavoritesStore::new(capabilities.store),
            primary: None,
            favorite_sessions: Vec::new(),
            unit: config.temperature_unit,
            search_error: None,
            geolocation_error: None,
            geolocation_requested: false,
            primary_claim: 0,
            next_generation: 0,
            in_flight: 0,
            runtime,
            tx,
            rx,
        })
    }

    /// Load persisted favorites and start fetching weather for each.
    pub fn init(&mut self) {
        let names = self.favorites.load().to_vec();
        self.favorite_sessions.clear();
        for name in &names {
            self.start_favorite(name);
        }
        tracing::info!("Controller initialized with {} favorite(s)", names.len());
    }

    /// Replace the primary session with a search for `place`.
    ///
    /// Blank input records a validation error and touches nothing else.
    pub fn search(&mut self, place: &str) {
        if place.trim().is_empty() {
            self.search_error = Some(WeatherError::Validation(
                "search text is blank".to_string(),
            ));
            return;
        }

        self.search_error = None;
        let generation = self.bump_generation();
        self.primary_claim = generation;
        tracing::info!("Searching for {:?}", place.trim());
        self.install_primary(LocationSession::searched(place, generation));
    }

    /// Ask the position sensor once. Success replaces the primary session
    /// unless a search has claimed it in the meantime.
    pub fn use_current_position(&mut self) {
        if self.geolocation_requested {
            tracing::debug!("Position already requested for this run");
            return;
        }
        self.geolocation_requested = true;

        let generation = self.bump_generation();
        self.primary_claim = generation;

        let sensor = self.sensor.clone();
        let tx = self.tx.clone();
        self.in_flight += 1;
        self.runtime.spawn(async move {
            let result = sensor.current_position().await;
            let _ = tx.send(ControllerEvent::Position { generation, result });
        });
    }

    /// Favorite the ready primary location under its resolved name, then
    /// start (or restart) that favorite's session.
    ///
    /// Returns the stored name, or `None` when there is no ready primary.
    pub fn add_favorite(&mut self) -> Result<Option<String>, DatabaseError> {
        let Some(name) = self
            .primary
            .as_ref()
            .and_then(|session| session.resolved_name())
            .map(str::to_string)
        else {
            tracing::debug!("No ready primary location to favorite");
            return Ok(None);
        };

        self.favorites.add(&name)?;
        self.start_favorite(&name);
        Ok(Some(name))
    }

    /// Remove a favorite and drop its session. Returns whether it existed.
    pub fn remove_favorite(&mut self, name: &str) -> Result<bool, DatabaseError> {
        if !self.favorites.contains(name) {
            return Ok(false);
        }

        self.favorites.remove(name)?;
        self.favorite_sessions
            .retain(|session| session.identifier().place_name() != Some(name));
        tracing::info!("Removed favorite {:?}", name);
        Ok(true)
    }

    /// Start a new lifecycle for the current primary identifier.
    pub fn refresh_primary(&mut self) {
        if self.primary.is_none() {
            return;
        }
        let generation = self.bump_generation();
        let Some(session) = self
            .primary
            .as_ref()
            .map(|previous| previous.restarted(generation))
        else {
            return;
        };
        self.primary_claim = generation;
        self.install_primary(session);
    }

    /// Start a new lifecycle for every favorite.
    pub fn refresh_favorites(&mut self) {
        for name in self.favorites.items().to_vec() {
            self.start_favorite(&name);
        }
    }

    /// Flip between Celsius and Fahrenheit. Display only; nothing is fetched.
    pub fn toggle_unit(&mut self) -> TemperatureUnit {
        self.unit = self.unit.toggled();
        self.unit
    }

    pub fn unit(&self) -> TemperatureUnit {
        self.unit
    }

    /// Whole-degree temperature of `snapshot` in the current unit.
    pub fn display_temperature(&self, snapshot: &WeatherSnapshot) -> i64 {
        display_temperature(snapshot.temperature_celsius, self.unit)
    }

    /// e.g. "18°C"
    pub fn temperature_label(&self, snapshot: &WeatherSnapshot) -> String {
        format!("{}{}", self.display_temperature(snapshot), self.unit.symbol())
    }

    pub fn primary(&self) -> Option<&LocationSession> {
        self.primary.as_ref()
    }

    /// Favorite sessions, in favorites-list order.
    pub fn favorite_sessions(&self) -> &[LocationSession] {
        &self.favorite_sessions
    }

    pub fn favorite(&self, name: &str) -> Option<&LocationSession> {
        self.favorite_sessions
            .iter()
            .find(|session| session.identifier().place_name() == Some(name))
    }

    pub fn favorite_names(&self) -> &[String] {
        self.favorites.items()
    }

    pub fn search_error(&self) -> Option<&WeatherError> {
        self.search_error.as_ref()
    }

    pub fn geolocation_error(&self) -> Option<&WeatherError> {
        self.geolocation_error.as_ref()
    }

    /// Any session resolving or fetching current weather.
    pub fn is_loading(&self) -> bool {
        self.primary.iter().any(LocationSession::loading)
            || self.favorite_sessions.iter().any(LocationSession::loading)
    }

    /// Number of capability calls not yet applied.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Apply every completion already delivered, without waiting.
    pub fn process_pending(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.rx.try_recv() {
            self.apply_event(event);
            applied += 1;
        }
        applied
    }

    /// Wait for one completion and apply it. Returns `false` when nothing is
    /// in flight.
    pub async fn next_event(&mut self) -> bool {
        if self.in_flight == 0 {
            return false;
        }
        match self.rx.recv().await {
            Some(event) => {
                self.apply_event(event);
                true
            }
            None => false,
        }
    }

    /// Apply completions until nothing is in flight.
    pub async fn settle(&mut self) {
        while self.next_event().await {}
    }

    fn bump_generation(&mut self) -> u64 {
        self.next_generation += 1;
        self.next_generation
    }

    fn install_primary(&mut self, mut session: LocationSession) {
        let generation = session.generation();
        let commands = session.start();
        self.primary = Some(session);
        self.dispatch(SessionKey::Primary, generation, commands);
    }

    fn start_favorite(&mut self, name: &str) {
        let generation = self.bump_generation();
        let mut session = LocationSession::favorite(name, generation);
        let commands = session.start();

        match self
            .favorite_sessions
            .iter_mut()
            .find(|existing| existing.identifier().place_name() == Some(name))
        {
            Some(existing) => *existing = session,
            None => self.favorite_sessions.push(session),
        }

        self.dispatch(SessionKey::Favorite(name.to_string()), generation, commands);
    }

    fn session_mut(&mut self, key: &SessionKey) -> Option<&mut LocationSession> {
        match key {
            SessionKey::Primary => self.primary.as_mut(),
            SessionKey::Favorite(name) => self
                .favorite_sessions
                .iter_mut()
                .find(|session| session.identifier().place_name() == Some(name.as_str())),
        }
    }

    fn dispatch(&mut self, key: SessionKey, generation: u64, commands: Vec<FetchCommand>) {
        for command in commands {
            let tx = self.tx.clone();
            let key = key.clone();
            let geocoder = self.geocoder.clone();
            let fetcher = self.fetcher.clone();
            self.in_flight += 1;

            self.runtime.spawn(async move {
                let outcome = match command {
                    FetchCommand::Resolve(place) => {
                        FetchOutcome::Resolved(geocoder.resolve(&place).await)
                    }
                    FetchCommand::FetchCurrent(target) => {
                        FetchOutcome::Current(fetcher.get_current(&target).await)
                    }
                    FetchCommand::FetchForecast(target) => {
                        FetchOutcome::Forecast(fetcher.get_forecast(&target).await)
                    }
                };
                // The receiver lives as long as the controller.
                let _ = tx.send(ControllerEvent::Fetch {
                    key,
                    generation,
                    outcome,
                });
            });
        }
    }

    fn apply_event(&mut self, event: ControllerEvent) {
        self.in_flight = self.in_flight.saturating_sub(1);

        match event {
            ControllerEvent::Fetch {
                key,
                generation,
                outcome,
            } => {
                let Some(session) = self.session_mut(&key) else {
                    tracing::debug!("Dropping result for removed session {:?}", key);
                    return;
                };
                if session.generation() != generation {
                    tracing::debug!(
                        "Discarding superseded result for {:?} (generation {}, current {})",
                        key,
                        generation,
                        session.generation()
                    );
                    return;
                }
                let commands = session.apply(outcome);
                self.dispatch(key, generation, commands);
            }
            ControllerEvent::Position { generation, result } => match result {
                Ok(coords) if self.primary_claim == generation => {
                    tracing::info!("Device position {}", coords);
                    self.install_primary(LocationSession::positioned(coords, generation));
                }
                Ok(coords) => {
                    tracing::debug!("Ignoring device position {}: a search replaced it", coords);
                }
                Err(e) => {
                    tracing::warn!("Device position unavailable: {}", e);
                    self.geolocation_error = Some(e);
                }
            },
        }
    }
}
