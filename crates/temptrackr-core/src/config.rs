use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Prefix for environment overrides, e.g. `TEMPTRACKR__GEOCODING__API_KEY`
pub const ENV_PREFIX: &str = "TEMPTRACKR";
/// Conventional variable consulted when no API key is configured
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

const APP_DIR: &str = "temptrackr";
const CONFIG_FILE: &str = "config.toml";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// All errors joined into one line
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application configuration directory
    pub config_dir: PathBuf,

    #[serde(default)]
    pub geocoding: GeocodingConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub history: HistoryConfig,

    #[serde(default)]
    pub location: LocationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    /// OpenWeatherMap-compatible API root (no `/geo/1.0` suffix)
    pub base_url: String,

    /// API key; falls back to `OPENWEATHER_API_KEY` when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    pub request_timeout_secs: u64,

    /// Maximum suggestions per search
    pub search_limit: usize,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openweathermap.org".to_string(),
            api_key: None,
            request_timeout_secs: 10,
            search_limit: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite file, relative to the config directory unless absolute
    pub database_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_file: "temptrackr.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    pub max_entries: usize,

    /// `prune` drops snapshots older than this
    pub retention_days: i64,

    /// Default look-back for history and stats
    pub window_days: i64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_entries: 1000,
            retention_days: 90,
            window_days: 30,
        }
    }
}

/// Fixed home position reported as the current location
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HomeLocation {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home: Option<HomeLocation>,

    pub timeout_secs: u64,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            home: None,
            timeout_secs: 10,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR);

        Self {
            config_dir,
            geocoding: GeocodingConfig::default(),
            storage: StorageConfig::default(),
            history: HistoryConfig::default(),
            location: LocationConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration, creating a default file on first run
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::default().save_to(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    /// Load configuration layered as defaults, then the TOML file at `path`
    /// (if present), then `TEMPTRACKR__SECTION__KEY` environment variables.
    pub fn load_from(path: &Path) -> Result<Self> {
        let defaults = config::Config::try_from(&Self::default())
            .context("Failed to build default settings")?;

        let settings = config::Config::builder()
            .add_source(defaults)
            .add_source(
                config::File::from(path)
                    .format(config::FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()
            .context("Failed to read config file")?;

        let mut config: Config = settings
            .try_deserialize()
            .context("Failed to parse config file")?;

        if config.geocoding.api_key.as_deref().map_or(true, str::is_empty) {
            config.geocoding.api_key = std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty());
        }

        Ok(config)
    }

    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.geocoding.base_url, "geocoding.base_url", &mut result);

        if self.geocoding.api_key.is_none() {
            result.add_warning(
                "geocoding.api_key",
                "No API key set - searches use the built-in city list",
            );
        }

        if self.geocoding.request_timeout_secs == 0 {
            result.add_error("geocoding.request_timeout_secs", "Timeout must be greater than 0");
        } else if self.geocoding.request_timeout_secs > 120 {
            result.add_warning(
                "geocoding.request_timeout_secs",
                "Timeout is unusually long (>120 seconds)",
            );
        }

        if self.geocoding.search_limit == 0 {
            result.add_error("geocoding.search_limit", "Search limit must be greater than 0");
        } else if self.geocoding.search_limit > 5 {
            result.add_warning(
                "geocoding.search_limit",
                "The geocoding API returns at most 5 results",
            );
        }

        if self.storage.database_file.trim().is_empty() {
            result.add_error("storage.database_file", "Database file name is empty");
        }

        if self.history.max_entries == 0 {
            result.add_error("history.max_entries", "History must keep at least one entry");
        }
        if self.history.retention_days <= 0 {
            result.add_error("history.retention_days", "Retention must be at least 1 day");
        }
        if self.history.window_days <= 0 {
            result.add_error("history.window_days", "Window must be at least 1 day");
        }

        if let Some(home) = self.location.home {
            if !(-90.0..=90.0).contains(&home.lat) {
                result.add_error("location.home.lat", "Latitude must be between -90 and 90");
            }
            if !(-180.0..=180.0).contains(&home.lon) {
                result.add_error("location.home.lon", "Longitude must be between -180 and 180");
            }
        }

        if self.location.timeout_secs == 0 {
            result.add_error("location.timeout_secs", "Timeout must be greater than 0");
        }

        result
    }

    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }

                if url.port() == Some(0) {
                    result.add_error(field_name, "Port cannot be 0");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Path of the SQLite database
    pub fn database_path(&self) -> PathBuf {
        self.config_dir.join(&self.storage.database_file)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, contents).context("Failed to write config file")?;

        tracing::debug!("Wrote config to {}", path.display());
        Ok(())
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join(APP_DIR);

        Ok(config_dir.join(CONFIG_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_default_config() {
        let config = Config::default();
        let result = config.validate();
        assert!(result.is_valid(), "Default config should be valid: {:?}", result.errors);
    }

    #[test]
    fn test_invalid_url() {
        let mut config = Config::default();
        config.geocoding.base_url = "not-a-url".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "geocoding.base_url"));
    }

    #[test]
    fn test_invalid_url_scheme() {
        let mut config = Config::default();
        config.geocoding.base_url = "ftp://localhost:8080".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.message.contains("http or https")));
    }

    #[test]
    fn test_missing_api_key_is_warning() {
        let mut config = Config::default();
        config.geocoding.api_key = None;
        let result = config.validate();
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.field == "geocoding.api_key"));
    }

    #[test]
    fn test_home_out_of_range() {
        let mut config = Config::default();
        config.location.home = Some(HomeLocation { lat: 95.0, lon: 10.0 });
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "location.home.lat"));
    }

    #[test]
    fn test_zero_limits_are_errors() {
        let mut config = Config::default();
        config.history.max_entries = 0;
        config.geocoding.search_limit = 0;
        let result = config.validate();
        assert_eq!(result.errors.len(), 2);
    }

    #[test]
    fn test_validation_result_error_summary() {
        let mut result = ValidationResult::default();
        result.add_error("field1", "error1");
        result.add_error("field2", "error2");
        assert_eq!(result.error_summary(), "field1: error1; field2: error2");
    }

    #[test]
    fn test_load_from_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.history.max_entries, 1000);
        assert_eq!(config.geocoding.search_limit, 5);
        assert!(config.location.home.is_none());
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
config_dir = "/tmp/temptrackr-test"

[history]
max_entries = 50
retention_days = 30
window_days = 7

[location]
timeout_secs = 5

[location.home]
lat = 60.39
lon = 5.32
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.history.max_entries, 50);
        assert_eq!(config.history.window_days, 7);
        assert_eq!(config.location.home, Some(HomeLocation { lat: 60.39, lon: 5.32 }));
        assert_eq!(config.geocoding.request_timeout_secs, 10);
        assert_eq!(
            config.database_path(),
            PathBuf::from("/tmp/temptrackr-test/temptrackr.db")
        );
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.history.retention_days = 14;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.history.retention_days, 14);
    }
}
