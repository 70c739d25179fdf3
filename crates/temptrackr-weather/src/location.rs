//! Saved and recent locations, device position, and geocoding entry points.

use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use temptrackr_store::{load_json, save_json, KvStore};

use crate::geocode::GeocodingClient;
use crate::types::{Coordinates, LocationError, LocationSuggestion, NewLocation, SavedLocation};

pub const LOCATIONS_KEY: &str = "weather-locations";
pub const RECENT_KEY: &str = "weather-recent-locations";
pub const MAX_RECENT: usize = 10;
const POSITION_TIMEOUT_SECS: u64 = 10;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Options passed to the position provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionOptions {
    pub high_accuracy: bool,
    pub timeout: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_secs(POSITION_TIMEOUT_SECS),
        }
    }
}

/// Source of the device's current position.
pub trait Geolocator: Send + Sync {
    fn current_position<'a>(
        &'a self,
        options: &'a PositionOptions,
    ) -> BoxFuture<'a, Result<Coordinates, LocationError>>;
}

/// Reports a fixed, configured position.
#[derive(Debug, Clone, Copy)]
pub struct FixedGeolocator {
    position: Coordinates,
}

impl FixedGeolocator {
    pub fn new(position: Coordinates) -> Self {
        Self { position }
    }
}

impl Geolocator for FixedGeolocator {
    fn current_position<'a>(
        &'a self,
        _options: &'a PositionOptions,
    ) -> BoxFuture<'a, Result<Coordinates, LocationError>> {
        Box::pin(async move { Ok(self.position) })
    }
}

/// Manages saved locations and the recent-locations list.
///
/// Every mutation reads the whole collection, changes it and writes it back.
/// Storage failures are logged and never reach the caller.
#[derive(Clone)]
pub struct LocationManager {
    store: Arc<dyn KvStore>,
    geocoder: GeocodingClient,
    geolocator: Option<Arc<dyn Geolocator>>,
    position_options: PositionOptions,
}

impl LocationManager {
    pub fn new(store: Arc<dyn KvStore>, geocoder: GeocodingClient) -> Self {
        Self {
            store,
            geocoder,
            geolocator: None,
            position_options: PositionOptions::default(),
        }
    }

    pub fn with_geolocator(mut self, geolocator: Arc<dyn Geolocator>) -> Self {
        self.geolocator = Some(geolocator);
        self
    }

    pub fn with_position_options(mut self, options: PositionOptions) -> Self {
        self.position_options = options;
        self
    }

    fn persist<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        if let Err(e) = save_json(self.store.as_ref(), key, value) {
            tracing::warn!("Failed to write '{}': {}", key, e);
        }
    }

    pub fn get_saved_locations(&self) -> Vec<SavedLocation> {
        load_json(self.store.as_ref(), LOCATIONS_KEY)
    }

    /// Save a location, updating the existing entry with the same name
    /// (case-insensitive) in place. The stored record is returned.
    pub fn save_location(&self, location: NewLocation) -> SavedLocation {
        let mut locations = self.get_saved_locations();
        let now = Utc::now();

        let existing = locations
            .iter()
            .position(|l| l.name.to_lowercase() == location.name.to_lowercase());

        let saved = match existing {
            Some(index) => {
                let updated = SavedLocation {
                    id: locations[index].id.clone(),
                    name: location.name,
                    display_name: location.display_name,
                    country: location.country,
                    is_favorite: location.is_favorite,
                    last_updated: now,
                    coordinates: location.coordinates.or(locations[index].coordinates),
                };
                locations[index] = updated.clone();
                updated
            }
            None => {
                let ids: HashSet<&str> = locations.iter().map(|l| l.id.as_str()).collect();
                let mut millis = now.timestamp_millis();
                while ids.contains(millis.to_string().as_str()) {
                    millis += 1;
                }

                let created = SavedLocation {
                    id: millis.to_string(),
                    name: location.name,
                    display_name: location.display_name,
                    country: location.country,
                    is_favorite: location.is_favorite,
                    last_updated: now,
                    coordinates: location.coordinates,
                };
                locations.push(created.clone());
                created
            }
        };

        self.persist(LOCATIONS_KEY, &locations);
        tracing::debug!("Saved location {} ({})", saved.display_name, saved.id);
        saved
    }

    pub fn remove_location(&self, id: &str) {
        let mut locations = self.get_saved_locations();
        let before = locations.len();
        locations.retain(|l| l.id != id);

        if locations.len() != before {
            self.persist(LOCATIONS_KEY, &locations);
        }
    }

    pub fn toggle_favorite(&self, id: &str) {
        let mut locations = self.get_saved_locations();
        let Some(location) = locations.iter_mut().find(|l| l.id == id) else {
            return;
        };

        location.is_favorite = !location.is_favorite;
        location.last_updated = Utc::now();
        self.persist(LOCATIONS_KEY, &locations);
    }

    pub fn get_favorite_locations(&self) -> Vec<SavedLocation> {
        self.get_saved_locations()
            .into_iter()
            .filter(|l| l.is_favorite)
            .collect()
    }

    /// Move `location` to the front of the recent list, keeping at most
    /// `MAX_RECENT` entries.
    pub fn add_to_recent(&self, location: &str) {
        let mut recent = self.get_recent_locations();
        recent.retain(|l| l != location);
        recent.insert(0, location.to_string());
        recent.truncate(MAX_RECENT);
        self.persist(RECENT_KEY, &recent);
    }

    pub fn get_recent_locations(&self) -> Vec<String> {
        load_json(self.store.as_ref(), RECENT_KEY)
    }

    /// Current device position, or `None` when no provider is configured,
    /// the provider fails, or it does not answer within the timeout.
    pub async fn get_current_location(&self) -> Option<Coordinates> {
        let Some(geolocator) = self.geolocator.as_ref() else {
            tracing::debug!("No geolocation provider configured");
            return None;
        };

        let options = self.position_options;
        match tokio::time::timeout(options.timeout, geolocator.current_position(&options)).await {
            Ok(Ok(coords)) => Some(coords),
            Ok(Err(e)) => {
                tracing::warn!("Geolocation failed: {}", e);
                None
            }
            Err(_) => {
                tracing::warn!("{}", LocationError::Timeout);
                None
            }
        }
    }

    pub async fn search_locations(&self, query: &str) -> Vec<LocationSuggestion> {
        self.geocoder.search(query).await
    }

    pub async fn reverse_geocode(&self, lat: f64, lon: f64) -> Option<String> {
        self.geocoder.reverse(lat, lon).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geocode::GeocodingConfig;
    use temptrackr_store::MemoryStore;

    struct DeniedGeolocator;

    impl Geolocator for DeniedGeolocator {
        fn current_position<'a>(
            &'a self,
            _options: &'a PositionOptions,
        ) -> BoxFuture<'a, Result<Coordinates, LocationError>> {
            Box::pin(async { Err(LocationError::PermissionDenied) })
        }
    }

    struct SlowGeolocator;

    impl Geolocator for SlowGeolocator {
        fn current_position<'a>(
            &'a self,
            _options: &'a PositionOptions,
        ) -> BoxFuture<'a, Result<Coordinates, LocationError>> {
            Box::pin(async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(Coordinates::new(0.0, 0.0))
            })
        }
    }

    fn manager() -> (Arc<MemoryStore>, LocationManager) {
        let store = Arc::new(MemoryStore::new());
        let geocoder = GeocodingClient::new(GeocodingConfig::default()).unwrap();
        (store.clone(), LocationManager::new(store, geocoder))
    }

    fn new_location(name: &str) -> NewLocation {
        NewLocation {
            name: name.to_string(),
            display_name: format!("{}, Somewhere", name),
            country: "XX".to_string(),
            is_favorite: false,
            coordinates: None,
        }
    }

    #[test]
    fn test_empty_store_has_no_locations() {
        let (_, manager) = manager();
        assert!(manager.get_saved_locations().is_empty());
        assert!(manager.get_recent_locations().is_empty());
    }

    #[test]
    fn test_save_assigns_unique_ids() {
        let (_, manager) = manager();
        let a = manager.save_location(new_location("Oslo"));
        let b = manager.save_location(new_location("Bergen"));
        let c = manager.save_location(new_location("Tromsø"));

        assert_ne!(a.id, b.id);
        assert_ne!(b.id, c.id);
        assert_ne!(a.id, c.id);
        assert_eq!(manager.get_saved_locations().len(), 3);
    }

    #[test]
    fn test_save_same_name_updates_in_place() {
        let (_, manager) = manager();
        let first = manager.save_location(new_location("London"));

        let mut again = new_location("LONDON");
        again.display_name = "London, GB".to_string();
        again.is_favorite = true;
        let second = manager.save_location(again);

        assert_eq!(first.id, second.id);
        let all = manager.get_saved_locations();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].display_name, "London, GB");
        assert!(all[0].is_favorite);
    }

    #[test]
    fn test_update_without_coordinates_keeps_stored_ones() {
        let (_, manager) = manager();
        let mut paris = new_location("Paris");
        paris.coordinates = Some(Coordinates::new(48.85, 2.35));
        manager.save_location(paris);

        let updated = manager.save_location(new_location("paris"));
        assert_eq!(updated.coordinates, Some(Coordinates::new(48.85, 2.35)));
        assert_eq!(
            manager.get_saved_locations()[0].coordinates,
            Some(Coordinates::new(48.85, 2.35))
        );

        let mut moved = new_location("Paris");
        moved.coordinates = Some(Coordinates::new(48.86, 2.34));
        let moved = manager.save_location(moved);
        assert_eq!(moved.coordinates, Some(Coordinates::new(48.86, 2.34)));
    }

    #[test]
    fn test_toggle_favorite() {
        let (_, manager) = manager();
        let saved = manager.save_location(new_location("Lima"));

        manager.toggle_favorite(&saved.id);
        assert_eq!(manager.get_favorite_locations().len(), 1);

        manager.toggle_favorite(&saved.id);
        assert!(manager.get_favorite_locations().is_empty());
    }

    #[test]
    fn test_unknown_ids_change_nothing() {
        let (_, manager) = manager();
        manager.save_location(new_location("Quito"));
        let before = manager.get_saved_locations();

        manager.toggle_favorite("does-not-exist");
        manager.remove_location("does-not-exist");

        assert_eq!(manager.get_saved_locations(), before);
    }

    #[test]
    fn test_remove_location() {
        let (_, manager) = manager();
        let a = manager.save_location(new_location("Rome"));
        manager.save_location(new_location("Milan"));

        manager.remove_location(&a.id);
        let names: Vec<_> = manager
            .get_saved_locations()
            .into_iter()
            .map(|l| l.name)
            .collect();
        assert_eq!(names, vec!["Milan"]);
    }

    #[test]
    fn test_recent_moves_to_front_without_duplicates() {
        let (_, manager) = manager();
        manager.add_to_recent("A");
        manager.add_to_recent("B");
        manager.add_to_recent("A");

        assert_eq!(manager.get_recent_locations(), vec!["A", "B"]);
    }

    #[test]
    fn test_recent_is_capped() {
        let (_, manager) = manager();
        for i in 0..15 {
            manager.add_to_recent(&format!("City {}", i));
        }

        let recent = manager.get_recent_locations();
        assert_eq!(recent.len(), MAX_RECENT);
        assert_eq!(recent[0], "City 14");
        assert_eq!(recent[9], "City 5");
    }

    #[test]
    fn test_corrupt_data_reads_as_empty() {
        let (store, manager) = manager();
        store.set(LOCATIONS_KEY, "{not json").unwrap();
        store.set(RECENT_KEY, "42").unwrap();

        assert!(manager.get_saved_locations().is_empty());
        assert!(manager.get_recent_locations().is_empty());
    }

    #[tokio::test]
    async fn test_current_location_without_provider() {
        let (_, manager) = manager();
        assert_eq!(manager.get_current_location().await, None);
    }

    #[tokio::test]
    async fn test_current_location_fixed() {
        let (_, manager) = manager();
        let home = Coordinates::new(60.39, 5.32);
        let manager = manager.with_geolocator(Arc::new(FixedGeolocator::new(home)));
        assert_eq!(manager.get_current_location().await, Some(home));
    }

    #[tokio::test]
    async fn test_current_location_denied() {
        let (_, manager) = manager();
        let manager = manager.with_geolocator(Arc::new(DeniedGeolocator));
        assert_eq!(manager.get_current_location().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_current_location_times_out() {
        let (_, manager) = manager();
        let manager = manager.with_geolocator(Arc::new(SlowGeolocator));
        assert_eq!(manager.get_current_location().await, None);
    }
}
