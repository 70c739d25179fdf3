//! Weather analytics and location services for TempTrackr
//!
//! Heuristic forecasts from current conditions, saved/recent locations with
//! geocoding and a built-in city fallback, daily history with stats, and
//! display helpers.

pub mod cities;
pub mod geocode;
pub mod history;
pub mod location;
pub mod outfit;
pub mod predictor;
pub mod types;
pub mod utils;

pub use geocode::{GeocodingClient, GeocodingConfig};
pub use history::{HistoricalWeatherEntry, HistoricalWeatherStorage, LocationStats};
pub use location::{FixedGeolocator, Geolocator, LocationManager, PositionOptions};
pub use outfit::{suggest_outfit, OutfitSuggestion};
pub use predictor::{PredictionResult, WeatherAnalytics, WeatherPredictor};
pub use types::*;
pub use utils::{condition_color, weather_icon};
