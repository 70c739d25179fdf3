//! Clothing suggestions derived from current conditions.

use serde::{Deserialize, Serialize};

use crate::types::WeatherData;

const WINDY_KMH: u32 = 20;
const HUMID_PERCENT: u32 = 80;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutfitSuggestion {
    pub category: String,
    pub items: Vec<String>,
    pub reason: String,
}

impl OutfitSuggestion {
    fn new(category: &str, items: &[&str], reason: String) -> Self {
        Self {
            category: category.to_string(),
            items: items.iter().map(|i| i.to_string()).collect(),
            reason,
        }
    }
}

fn temperature_band(temp: f64) -> OutfitSuggestion {
    if temp < 0.0 {
        OutfitSuggestion::new(
            "Winter Essentials",
            &[
                "Heavy winter coat",
                "Thermal underwear",
                "Wool sweater",
                "Insulated boots",
                "Warm hat & gloves",
            ],
            format!("Extremely cold at {}°C - dress in layers for warmth", temp),
        )
    } else if temp < 10.0 {
        OutfitSuggestion::new(
            "Cold Weather",
            &[
                "Warm jacket",
                "Long pants",
                "Closed shoes",
                "Light scarf",
                "Sweater or hoodie",
            ],
            format!("Cold temperature at {}°C - layer up for comfort", temp),
        )
    } else if temp < 20.0 {
        OutfitSuggestion::new(
            "Mild Weather",
            &[
                "Light jacket or cardigan",
                "Long pants or jeans",
                "Comfortable shoes",
                "Light sweater",
            ],
            format!("Mild temperature at {}°C - perfect for layering", temp),
        )
    } else if temp < 30.0 {
        OutfitSuggestion::new(
            "Warm Weather",
            &[
                "T-shirt or light blouse",
                "Shorts or light pants",
                "Sandals or sneakers",
                "Light cardigan",
            ],
            format!("Pleasant temperature at {}°C - dress comfortably", temp),
        )
    } else {
        OutfitSuggestion::new(
            "Hot Weather",
            &[
                "Lightweight breathable fabrics",
                "Shorts",
                "Sandals",
                "Sun hat",
                "Sunglasses",
            ],
            format!("Hot temperature at {}°C - stay cool and protected", temp),
        )
    }
}

/// Suggestions in display order: one temperature band, then any
/// precipitation, wind and humidity additions that apply.
pub fn suggest_outfit(weather: &WeatherData) -> Vec<OutfitSuggestion> {
    let condition = weather.condition.to_lowercase();
    let mut suggestions = vec![temperature_band(weather.temperature)];

    if condition.contains("rain") || condition.contains("drizzle") {
        suggestions.push(OutfitSuggestion::new(
            "Rain Protection",
            &[
                "Waterproof jacket or raincoat",
                "Umbrella",
                "Waterproof shoes",
                "Quick-dry materials",
            ],
            "Rain expected - stay dry and comfortable".to_string(),
        ));
    }

    if condition.contains("snow") {
        suggestions.push(OutfitSuggestion::new(
            "Snow Gear",
            &[
                "Waterproof boots",
                "Warm socks",
                "Gloves",
                "Snow-resistant outer layer",
            ],
            "Snow conditions - prioritize warmth and traction".to_string(),
        ));
    }

    if weather.wind_speed > WINDY_KMH {
        suggestions.push(OutfitSuggestion::new(
            "Windy Conditions",
            &[
                "Wind-resistant jacket",
                "Secure hat or avoid loose items",
                "Closed shoes",
                "Fitted clothing",
            ],
            format!(
                "Strong winds at {} km/h - avoid loose clothing",
                weather.wind_speed
            ),
        ));
    }

    if weather.humidity > HUMID_PERCENT {
        suggestions.push(OutfitSuggestion::new(
            "High Humidity",
            &[
                "Breathable fabrics",
                "Moisture-wicking materials",
                "Light colors",
                "Minimal layers",
            ],
            format!(
                "High humidity at {}% - choose breathable materials",
                weather.humidity
            ),
        ));
    }

    suggestions
}
