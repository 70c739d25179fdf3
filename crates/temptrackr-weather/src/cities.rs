//! Built-in city table used when the geocoding service is unreachable.

use crate::types::{Coordinates, LocationSuggestion};

/// A well-known city: (name, display name, country code, lat, lon)
#[derive(Debug, Clone, Copy)]
pub struct City {
    pub name: &'static str,
    pub display_name: &'static str,
    pub country: &'static str,
    pub lat: f64,
    pub lon: f64,
}

impl City {
    const fn new(
        name: &'static str,
        display_name: &'static str,
        country: &'static str,
        lat: f64,
        lon: f64,
    ) -> Self {
        Self {
            name,
            display_name,
            country,
            lat,
            lon,
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lon)
    }

    pub fn to_suggestion(&self) -> LocationSuggestion {
        LocationSuggestion {
            name: self.name.to_string(),
            display_name: self.display_name.to_string(),
            country: self.country.to_string(),
            coordinates: self.coordinates(),
        }
    }

    /// Case-insensitive substring match on name, display name or country.
    /// `needle` must already be lowercase.
    fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self.display_name.to_lowercase().contains(needle)
            || self.country.to_lowercase().contains(needle)
    }
}

pub const FALLBACK_CITIES: &[City] = &[
    City::new("New York", "New York, NY, US", "US", 40.7128, -74.006),
    City::new("London", "London, UK", "GB", 51.5074, -0.1278),
    City::new("Tokyo", "Tokyo, Japan", "JP", 35.6762, 139.6503),
    City::new("Sydney", "Sydney, Australia", "AU", -33.8688, 151.2093),
    City::new("Mumbai", "Mumbai, India", "IN", 19.076, 72.8777),
    City::new("Paris", "Paris, France", "FR", 48.8566, 2.3522),
    City::new("Berlin", "Berlin, Germany", "DE", 52.52, 13.405),
    City::new("Toronto", "Toronto, ON, Canada", "CA", 43.6532, -79.3832),
    City::new("Dubai", "Dubai, UAE", "AE", 25.2048, 55.2708),
    City::new("Singapore", "Singapore", "SG", 1.3521, 103.8198),
    City::new("Los Angeles", "Los Angeles, CA, US", "US", 34.0522, -118.2437),
    City::new("Chicago", "Chicago, IL, US", "US", 41.8781, -87.6298),
    City::new("Miami", "Miami, FL, US", "US", 25.7617, -80.1918),
    City::new("San Francisco", "San Francisco, CA, US", "US", 37.7749, -122.4194),
    City::new("Seattle", "Seattle, WA, US", "US", 47.6062, -122.3321),
    City::new("Barcelona", "Barcelona, Spain", "ES", 41.3851, 2.1734),
    City::new("Rome", "Rome, Italy", "IT", 41.9028, 12.4964),
    City::new("Amsterdam", "Amsterdam, Netherlands", "NL", 52.3676, 4.9041),
    City::new("Stockholm", "Stockholm, Sweden", "SE", 59.3293, 18.0686),
    City::new("Copenhagen", "Copenhagen, Denmark", "DK", 55.6761, 12.5683),
    City::new("Moscow", "Moscow, Russia", "RU", 55.7558, 37.6176),
    City::new("Beijing", "Beijing, China", "CN", 39.9042, 116.4074),
    City::new("Shanghai", "Shanghai, China", "CN", 31.2304, 121.4737),
    City::new("Seoul", "Seoul, South Korea", "KR", 37.5665, 126.978),
    City::new("Bangkok", "Bangkok, Thailand", "TH", 13.7563, 100.5018),
    City::new("Cairo", "Cairo, Egypt", "EG", 30.0444, 31.2357),
    City::new("Cape Town", "Cape Town, South Africa", "ZA", -33.9249, 18.4241),
    City::new("São Paulo", "São Paulo, Brazil", "BR", -23.5505, -46.6333),
    City::new("Mexico City", "Mexico City, Mexico", "MX", 19.4326, -99.1332),
    City::new("Buenos Aires", "Buenos Aires, Argentina", "AR", -34.6118, -58.396),
];

/// Search the built-in table. Returns at most `limit` hits in table order.
pub fn search_fallback(query: &str, limit: usize) -> Vec<LocationSuggestion> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    FALLBACK_CITIES
        .iter()
        .filter(|c| c.matches(&needle))
        .take(limit)
        .map(City::to_suggestion)
        .collect()
}

/// Closest built-in city by Manhattan distance in degrees.
pub fn nearest_city(target: Coordinates) -> Option<&'static City> {
    FALLBACK_CITIES.iter().min_by(|a, b| {
        a.coordinates()
            .manhattan_distance(&target)
            .total_cmp(&b.coordinates().manhattan_distance(&target))
    })
}
