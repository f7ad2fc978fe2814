use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use avash_core::TemperatureUnit;

/// Base path for OpenWeatherMap condition icons.
pub const ICON_BASE_URL: &str = "https://openweathermap.org/img/w";

/// Geographic position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// What weather is requested for: a free-text place or a resolved position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LocationIdentifier {
    Place(String),
    Coordinates(Coordinates),
}

impl LocationIdentifier {
    /// Place identifier with surrounding whitespace removed.
    pub fn place(name: &str) -> Self {
        Self::Place(name.trim().to_string())
    }

    pub fn place_name(&self) -> Option<&str> {
        match self {
            Self::Place(name) => Some(name),
            Self::Coordinates(_) => None,
        }
    }
}

impl std::fmt::Display for LocationIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Place(name) => f.write_str(name),
            Self::Coordinates(coords) => write!(f, "{}", coords),
        }
    }
}

/// Point-in-time conditions for one place. Temperatures are always Celsius.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub temperature_celsius: f64,
    pub humidity_percent: u8,
    pub wind_speed: f64,
    pub description: String,
    pub icon_code: String,
    pub captured_for: Coordinates,
    /// Place name reported by the upstream, when it has one
    pub place_name: Option<String>,
}

impl WeatherSnapshot {
    pub fn icon_url(&self) -> String {
        icon_url(&self.icon_code)
    }
}

/// One future time step of a forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub time: DateTime<Utc>,
    pub conditions: WeatherSnapshot,
}

/// Ordered forecast window, earliest entry first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSnapshot {
    pub location_name: Option<String>,
    pub entries: Vec<ForecastEntry>,
}

impl ForecastSnapshot {
    pub fn first(&self) -> Option<&ForecastEntry> {
        self.entries.first()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Display URL for an upstream icon code, e.g. "10d".
pub fn icon_url(icon_code: &str) -> String {
    format!("{}/{}.png", ICON_BASE_URL, icon_code)
}

/// Convert a stored Celsius value for display, rounded to a whole degree.
///
/// Halves round toward positive infinity, so -2.5 shows as -2.
pub fn display_temperature(celsius: f64, unit: TemperatureUnit) -> i64 {
    round_half_up(unit.convert(celsius)) as i64
}

fn round_half_up(value: f64) -> f64 {
    // `f64::round` sends halves away from zero; pull negative halves back up.
    let rounded = value.round();
    if value - rounded == 0.5 {
        rounded + 1.0
    } else {
        rounded
    }
}
