//! Forward and reverse geocoding against an OpenWeatherMap-compatible
//! geocoding API.
//!
//! Every failure (no API key, transport error, non-success status, bad body)
//! falls back to the built-in city table, so callers always get a usable
//! answer.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use crate::cities::{nearest_city, search_fallback};
use crate::types::{Coordinates, LocationSuggestion, WeatherError};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";
pub const DEFAULT_SEARCH_LIMIT: usize = 5;
const REQUEST_TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = "TempTrackr/0.1.0";

/// Geocoding client settings
#[derive(Debug, Clone)]
pub struct GeocodingConfig {
    /// Scheme and host, without the `/geo/1.0` path
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
    pub search_limit: usize,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            search_limit: DEFAULT_SEARCH_LIMIT,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeoItem {
    name: String,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    country: String,
    lat: f64,
    lon: f64,
}

impl GeoItem {
    /// "{name}, {state}, {country}", state omitted when absent or empty
    fn display_name(&self) -> String {
        match self.state.as_deref() {
            Some(state) if !state.is_empty() => {
                format!("{}, {}, {}", self.name, state, self.country)
            }
            _ => format!("{}, {}", self.name, self.country),
        }
    }

    fn into_suggestion(self) -> LocationSuggestion {
        LocationSuggestion {
            display_name: self.display_name(),
            coordinates: Coordinates::new(self.lat, self.lon),
            name: self.name,
            country: self.country,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeocodingClient {
    client: Arc<Client>,
    config: GeocodingConfig,
}

impl GeocodingClient {
    /// # Errors
    /// Returns `WeatherError::Network` if the HTTP client cannot be built.
    pub fn new(config: GeocodingConfig) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            config,
        })
    }

    fn api_key(&self) -> Result<&str, WeatherError> {
        self.config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| WeatherError::Config("geocoding API key not set".to_string()))
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/geo/1.0/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Search places by free text.
    ///
    /// A blank query returns nothing without a request. On any failure the
    /// built-in city table is searched instead.
    pub async fn search(&self, query: &str) -> Vec<LocationSuggestion> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        match self.fetch_direct(query).await {
            Ok(items) => items.into_iter().map(GeoItem::into_suggestion).collect(),
            Err(e) => {
                tracing::warn!("Location search failed, using built-in cities: {}", e);
                search_fallback(query, self.config.search_limit)
            }
        }
    }

    /// Reverse geocode coordinates to a display name (e.g. "Seattle, Washington, US").
    ///
    /// Falls back to the nearest built-in city when the API fails or has no
    /// match.
    pub async fn reverse(&self, lat: f64, lon: f64) -> Option<String> {
        match self.fetch_reverse(lat, lon).await {
            Ok(Some(item)) => {
                let name = item.display_name();
                tracing::info!("Reverse geocoded to: {}", name);
                return Some(name);
            }
            Ok(None) => {
                tracing::debug!("Reverse geocode returned no results for {}, {}", lat, lon);
            }
            Err(e) => {
                tracing::warn!("Reverse geocode failed, using built-in cities: {}", e);
            }
        }

        nearest_city(Coordinates::new(lat, lon)).map(|c| c.display_name.to_string())
    }

    async fn fetch_direct(&self, query: &str) -> Result<Vec<GeoItem>, WeatherError> {
        let api_key = self.api_key()?;
        let limit = self.config.search_limit.to_string();

        let response = self
            .client
            .get(self.endpoint("direct"))
            .query(&[("q", query), ("limit", limit.as_str()), ("appid", api_key)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(WeatherError::Status(response.status().as_u16()));
        }

        response
            .json::<Vec<GeoItem>>()
            .await
            .map_err(|e| WeatherError::Parse(e.to_string()))
    }

    async fn fetch_reverse(&self, lat: f64, lon: f64) -> Result<Option<GeoItem>, WeatherError> {
        let api_key = self.api_key()?;

        let response = self
            .client
            .get(self.endpoint("reverse"))
            .query(&[
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("limit", "1".to_string()),
                ("appid", api_key.to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(WeatherError::Status(response.status().as_u16()));
        }

        let items: Vec<GeoItem> = response
            .json()
            .await
            .map_err(|e| WeatherError::Parse(e.to_string()))?;

        Ok(items.into_iter().next())
    }
}
