//! Daily weather snapshots per location, with retention and summary stats.

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use temptrackr_store::{load_json, save_json, KvStore};

use crate::types::WeatherData;

pub const HISTORY_KEY: &str = "weather-historical-data";
pub const DEFAULT_MAX_ENTRIES: usize = 1000;

/// One stored snapshot. At most one per location and day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalWeatherEntry {
    /// `{location}-{millis}`
    pub id: String,
    pub location: String,
    pub date: NaiveDate,
    pub temperature: f64,
    pub condition: String,
    pub humidity: u32,
    pub wind_speed: u32,
    pub pressure: u32,
    pub visibility: u32,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricStats {
    pub avg: f64,
    pub min: f64,
    pub max: f64,
}

impl MetricStats {
    /// `None` for an empty sample
    fn from_values(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let mut count = 0usize;
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;

        for v in values {
            count += 1;
            sum += v;
            min = min.min(v);
            max = max.max(v);
        }

        (count > 0).then(|| Self {
            avg: sum / count as f64,
            min,
            max,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionFrequency {
    pub condition: String,
    pub count: usize,
    /// Rounded share of entries, 0-100
    pub percentage: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationStats {
    pub total_days: usize,
    pub temperature: MetricStats,
    pub humidity: MetricStats,
    pub wind_speed: MetricStats,
    pub pressure: MetricStats,
    pub conditions: Vec<ConditionFrequency>,
}

/// Historical snapshot store over a `KvStore`.
#[derive(Clone)]
pub struct HistoricalWeatherStorage {
    store: Arc<dyn KvStore>,
    max_entries: usize,
}

impl HistoricalWeatherStorage {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self {
            store,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }

    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    fn load(&self) -> Vec<HistoricalWeatherEntry> {
        load_json(self.store.as_ref(), HISTORY_KEY)
    }

    fn persist(&self, entries: &[HistoricalWeatherEntry]) {
        if let Err(e) = save_json(self.store.as_ref(), HISTORY_KEY, entries) {
            tracing::warn!("Failed to write weather history: {}", e);
        }
    }

    pub fn store_weather_data(&self, location: &str, weather: &WeatherData) {
        self.store_weather_data_at(location, weather, Utc::now());
    }

    /// Record today's snapshot for `location`, replacing an earlier one from
    /// the same day. Keeps the newest `max_entries` entries.
    pub fn store_weather_data_at(&self, location: &str, weather: &WeatherData, now: DateTime<Utc>) {
        let entry = HistoricalWeatherEntry {
            id: format!("{}-{}", location, now.timestamp_millis()),
            location: location.to_string(),
            date: now.date_naive(),
            temperature: weather.temperature,
            condition: weather.condition.clone(),
            humidity: weather.humidity,
            wind_speed: weather.wind_speed,
            pressure: weather.pressure,
            visibility: weather.visibility,
            timestamp: now,
        };

        let mut entries = self.load();
        match entries
            .iter_mut()
            .find(|e| e.location == entry.location && e.date == entry.date)
        {
            Some(existing) => *existing = entry,
            None => entries.push(entry),
        }

        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        entries.truncate(self.max_entries);

        tracing::debug!("Stored weather snapshot for {} ({} total)", location, entries.len());
        self.persist(&entries);
    }

    pub fn get_historical_data(&self, location: &str, days: i64) -> Vec<HistoricalWeatherEntry> {
        self.get_historical_data_at(location, days, Utc::now())
    }

    /// Entries whose location contains or is contained by `location`
    /// (ignoring case), dated within the last `days` days, oldest first.
    pub fn get_historical_data_at(
        &self,
        location: &str,
        days: i64,
        now: DateTime<Utc>,
    ) -> Vec<HistoricalWeatherEntry> {
        let query = location.to_lowercase();
        let cutoff = cutoff_date(now, days);

        let mut matching: Vec<_> = self
            .load()
            .into_iter()
            .filter(|e| {
                let name = e.location.to_lowercase();
                (name.contains(&query) || query.contains(&name)) && e.date >= cutoff
            })
            .collect();

        matching.sort_by_key(|e| e.date);
        matching
    }

    pub fn clear_old_data(&self, older_than_days: i64) {
        self.clear_old_data_at(older_than_days, Utc::now());
    }

    pub fn clear_old_data_at(&self, older_than_days: i64, now: DateTime<Utc>) {
        let cutoff = cutoff_date(now, older_than_days);
        let mut entries = self.load();
        let before = entries.len();
        entries.retain(|e| e.date >= cutoff);

        tracing::info!(
            "Pruned {} weather snapshots older than {}",
            before - entries.len(),
            cutoff
        );
        self.persist(&entries);
    }

    pub fn get_location_stats(&self, location: &str, days: i64) -> Option<LocationStats> {
        self.get_location_stats_at(location, days, Utc::now())
    }

    pub fn get_location_stats_at(
        &self,
        location: &str,
        days: i64,
        now: DateTime<Utc>,
    ) -> Option<LocationStats> {
        let data = self.get_historical_data_at(location, days, now);

        Some(LocationStats {
            total_days: data.len(),
            temperature: MetricStats::from_values(data.iter().map(|e| e.temperature))?,
            humidity: MetricStats::from_values(data.iter().map(|e| f64::from(e.humidity)))?,
            wind_speed: MetricStats::from_values(data.iter().map(|e| f64::from(e.wind_speed)))?,
            pressure: MetricStats::from_values(data.iter().map(|e| f64::from(e.pressure)))?,
            conditions: condition_frequency(&data),
        })
    }
}

/// `days` before today. Windows beyond the calendar range have no cutoff.
fn cutoff_date(now: DateTime<Utc>, days: i64) -> NaiveDate {
    Duration::try_days(days)
        .and_then(|window| now.date_naive().checked_sub_signed(window))
        .unwrap_or(NaiveDate::MIN)
}

/// Count per condition, most frequent first. Ties keep first-seen order.
fn condition_frequency(data: &[HistoricalWeatherEntry]) -> Vec<ConditionFrequency> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for entry in data {
        match counts.iter_mut().find(|(c, _)| *c == entry.condition) {
            Some((_, n)) => *n += 1,
            None => counts.push((entry.condition.as_str(), 1)),
        }
    }

    let total = data.len() as f64;
    let mut frequency: Vec<_> = counts
        .into_iter()
        .map(|(condition, count)| ConditionFrequency {
            condition: condition.to_string(),
            count,
            percentage: (count as f64 / total * 100.0).round() as u8,
        })
        .collect();

    frequency.sort_by(|a, b| b.count.cmp(&a.count));
    frequency
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UvIndex;
    use chrono::TimeZone;
    use temptrackr_store::MemoryStore;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, day, hour, 0, 0).unwrap()
    }

    fn weather(temperature: f64, condition: &str, humidity: u32) -> WeatherData {
        WeatherData {
            location: String::new(),
            temperature,
            condition: condition.to_string(),
            description: None,
            humidity,
            wind_speed: 10,
            pressure: 1012,
            visibility: 10,
            uv_index: UvIndex::Unknown,
            icon: None,
            timestamp: at(1, 0),
            coordinates: None,
        }
    }

    fn storage() -> (Arc<MemoryStore>, HistoricalWeatherStorage) {
        let store = Arc::new(MemoryStore::new());
        (store.clone(), HistoricalWeatherStorage::new(store))
    }

    #[test]
    fn test_same_day_replaces_entry() {
        let (_, history) = storage();
        history.store_weather_data_at("London, GB", &weather(12.0, "Rain", 80), at(10, 8));
        history.store_weather_data_at("London, GB", &weather(15.0, "Clouds", 70), at(10, 14));

        let data = history.get_historical_data_at("London", 30, at(10, 18));
        assert_eq!(data.len(), 1);
        assert_eq!(data[0].temperature, 15.0);
        assert_eq!(data[0].condition, "Clouds");
    }

    #[test]
    fn test_one_entry_per_day_and_location() {
        let (_, history) = storage();
        history.store_weather_data_at("London, GB", &weather(12.0, "Rain", 80), at(10, 8));
        history.store_weather_data_at("London, GB", &weather(13.0, "Rain", 80), at(11, 8));
        history.store_weather_data_at("Paris, FR", &weather(16.0, "Clear", 50), at(11, 9));

        let london = history.get_historical_data_at("london", 30, at(11, 12));
        let dates: Vec<_> = london.iter().map(|e| e.date.to_string()).collect();
        assert_eq!(dates, vec!["2026-10-10", "2026-10-11"]);
    }

    #[test]
    fn test_location_match_works_both_ways() {
        let (_, history) = storage();
        history.store_weather_data_at("London", &weather(12.0, "Rain", 80), at(10, 8));

        assert_eq!(history.get_historical_data_at("Lon", 30, at(10, 9)).len(), 1);
        assert_eq!(history.get_historical_data_at("London, GB", 30, at(10, 9)).len(), 1);
        assert!(history.get_historical_data_at("Paris", 30, at(10, 9)).is_empty());
    }

    #[test]
    fn test_window_is_inclusive() {
        let (_, history) = storage();
        history.store_weather_data_at("Oslo", &weather(5.0, "Snow", 90), at(1, 12));

        assert_eq!(history.get_historical_data_at("Oslo", 9, at(10, 12)).len(), 1);
        assert!(history.get_historical_data_at("Oslo", 8, at(10, 12)).is_empty());
    }

    #[test]
    fn test_cap_keeps_newest() {
        let store = Arc::new(MemoryStore::new());
        let history = HistoricalWeatherStorage::new(store).with_max_entries(3);

        for day in 1..=5 {
            let snapshot = weather(f64::from(day), "Clear", 50);
            history.store_weather_data_at("Lima", &snapshot, at(day, 12));
        }

        let data = history.get_historical_data_at("Lima", 30, at(5, 13));
        let temps: Vec<_> = data.iter().map(|e| e.temperature).collect();
        assert_eq!(temps, vec![3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_clear_old_data() {
        let (_, history) = storage();
        history.store_weather_data_at("Cairo", &weather(30.0, "Clear", 20), at(1, 12));
        history.store_weather_data_at("Cairo", &weather(31.0, "Clear", 20), at(20, 12));

        history.clear_old_data_at(10, at(25, 0));

        let data = history.get_historical_data_at("Cairo", 365, at(25, 0));
        assert_eq!(data.len(), 1);
        assert_eq!(data[0].temperature, 31.0);
    }

    #[test]
    fn test_huge_window_has_no_cutoff() {
        let (_, history) = storage();
        history.store_weather_data_at("London", &weather(12.0, "Rain", 80), at(1, 12));

        assert_eq!(history.get_historical_data_at("London", 100_000_000, at(10, 0)).len(), 1);
        assert_eq!(history.get_historical_data_at("London", i64::MAX, at(10, 0)).len(), 1);
        assert!(history.get_location_stats_at("London", i64::MAX, at(10, 0)).is_some());

        history.clear_old_data_at(i64::MAX, at(10, 0));
        assert_eq!(history.get_historical_data_at("London", 30, at(10, 0)).len(), 1);
    }

    #[test]
    fn test_stats_none_without_data() {
        let (_, history) = storage();
        assert!(history.get_location_stats_at("Nowhere", 30, at(10, 0)).is_none());
    }

    #[test]
    fn test_stats() {
        let (_, history) = storage();
        history.store_weather_data_at("Dublin", &weather(10.0, "Rain", 90), at(1, 12));
        history.store_weather_data_at("Dublin", &weather(14.0, "Clouds", 70), at(2, 12));
        history.store_weather_data_at("Dublin", &weather(12.0, "Rain", 80), at(3, 12));

        let stats = history.get_location_stats_at("Dublin", 30, at(3, 18)).unwrap();
        assert_eq!(stats.total_days, 3);
        assert_eq!(stats.temperature.avg, 12.0);
        assert_eq!(stats.temperature.min, 10.0);
        assert_eq!(stats.temperature.max, 14.0);
        assert_eq!(stats.humidity.avg, 80.0);
        assert_eq!(stats.pressure.max, 1012.0);

        assert_eq!(stats.conditions.len(), 2);
        assert_eq!(stats.conditions[0].condition, "Rain");
        assert_eq!(stats.conditions[0].count, 2);
        assert_eq!(stats.conditions[0].percentage, 67);
        assert_eq!(stats.conditions[1].percentage, 33);
    }

    #[test]
    fn test_corrupt_history_reads_as_empty() {
        let (store, history) = storage();
        store.set(HISTORY_KEY, "[{\"broken\":").unwrap();
        assert!(history.get_historical_data_at("Anywhere", 30, at(10, 0)).is_empty());
    }
}
