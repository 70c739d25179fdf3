use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Geographic coordinates in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Manhattan distance in degrees
    pub fn manhattan_distance(&self, other: &Coordinates) -> f64 {
        (self.lat - other.lat).abs() + (self.lon - other.lon).abs()
    }
}

/// UV index as supplied by the weather fetch.
///
/// The upstream API does not report UV on every plan, so the fetcher states
/// explicitly whether the value was measured, estimated, or is unknown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum UvIndex {
    Measured(f64),
    Estimated(f64),
    #[default]
    Unknown,
}

impl UvIndex {
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Measured(v) | Self::Estimated(v) => Some(*v),
            Self::Unknown => None,
        }
    }
}

/// Current weather conditions for one location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherData {
    /// Display name, e.g. "London, GB"
    pub location: String,
    /// °C, one decimal
    pub temperature: f64,
    /// Condition category, e.g. "Rain"
    pub condition: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Relative humidity, %
    pub humidity: u32,
    /// km/h
    pub wind_speed: u32,
    /// hPa
    pub pressure: u32,
    /// km
    pub visibility: u32,
    #[serde(default)]
    pub uv_index: UvIndex,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

/// Forecast for one calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastData {
    /// Short weekday label, e.g. "Mon"
    pub day: String,
    pub date: NaiveDate,
    pub high: f64,
    pub low: f64,
    pub condition: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    pub humidity: u32,
    pub wind_speed: u32,
}

impl ForecastData {
    /// Midpoint of the day's high and low
    pub fn mean_temperature(&self) -> f64 {
        (self.high + self.low) / 2.0
    }
}

/// A location the user has saved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedLocation {
    pub id: String,
    pub name: String,
    pub display_name: String,
    pub country: String,
    pub is_favorite: bool,
    pub last_updated: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

/// Input for saving a location (id and timestamp are assigned on save)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLocation {
    pub name: String,
    pub display_name: String,
    pub country: String,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
}

/// A geocoding search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationSuggestion {
    pub name: String,
    pub display_name: String,
    pub country: String,
    pub coordinates: Coordinates,
}

impl From<LocationSuggestion> for NewLocation {
    fn from(s: LocationSuggestion) -> Self {
        Self {
            name: s.name,
            display_name: s.display_name,
            country: s.country,
            is_favorite: false,
            coordinates: Some(s.coordinates),
        }
    }
}

/// Location service errors
#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location request timed out")]
    Timeout,
}

/// Weather service errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("API returned status {0}")]
    Status(u16),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
}
