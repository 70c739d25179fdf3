//! Display lookups for weather condition categories.

use serde::{Deserialize, Serialize};

/// Icon shown for conditions not in the table
pub const DEFAULT_ICON: &str = "🌤️";
/// Color class used for conditions not in the table
pub const DEFAULT_COLOR: &str = "text-primary";

/// Condition categories reported by the weather API (`weather[0].main`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeatherCondition {
    Clear,
    Clouds,
    Rain,
    Drizzle,
    Thunderstorm,
    Snow,
    Mist,
    Fog,
    Haze,
}

impl WeatherCondition {
    /// Parse a condition category. Matching ignores case and surrounding
    /// whitespace; anything else is `None`.
    pub fn parse(condition: &str) -> Option<Self> {
        let c = condition.trim();
        [
            Self::Clear,
            Self::Clouds,
            Self::Rain,
            Self::Drizzle,
            Self::Thunderstorm,
            Self::Snow,
            Self::Mist,
            Self::Fog,
            Self::Haze,
        ]
        .into_iter()
        .find(|k| k.name().eq_ignore_ascii_case(c))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Clear => "Clear",
            Self::Clouds => "Clouds",
            Self::Rain => "Rain",
            Self::Drizzle => "Drizzle",
            Self::Thunderstorm => "Thunderstorm",
            Self::Snow => "Snow",
            Self::Mist => "Mist",
            Self::Fog => "Fog",
            Self::Haze => "Haze",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::Clear => "☀️",
            Self::Clouds => "☁️",
            Self::Rain => "🌧️",
            Self::Drizzle => "🌦️",
            Self::Thunderstorm => "⛈️",
            Self::Snow => "❄️",
            Self::Mist | Self::Fog | Self::Haze => "🌫️",
        }
    }

    pub fn color_class(&self) -> &'static str {
        match self {
            Self::Clear => "text-yellow-500",
            Self::Clouds => "text-gray-500",
            Self::Rain => "text-blue-500",
            Self::Drizzle => "text-blue-400",
            Self::Thunderstorm => "text-purple-500",
            Self::Snow => "text-blue-200",
            Self::Mist | Self::Fog | Self::Haze => "text-gray-400",
        }
    }
}

/// Icon for a condition string
pub fn weather_icon(condition: &str) -> &'static str {
    WeatherCondition::parse(condition)
        .map(|c| c.icon())
        .unwrap_or(DEFAULT_ICON)
}

/// CSS color class for a condition string
pub fn condition_color(condition: &str) -> &'static str {
    WeatherCondition::parse(condition)
        .map(|c| c.color_class())
        .unwrap_or(DEFAULT_COLOR)
}
