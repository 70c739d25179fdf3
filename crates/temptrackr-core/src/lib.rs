pub mod config;
pub mod error;

pub use config::{
    Config, GeocodingConfig, HistoryConfig, HomeLocation, LocationConfig, StorageConfig,
    ValidationResult,
};
pub use error::{
    AppError, ConfigError, DatabaseError, GeocodingError, NetworkError, ReqwestErrorExt,
    RusqliteErrorExt, WeatherError,
};

use anyhow::Result;

/// Initialize logging. `RUST_LOG` overrides the default `info` filter.
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("TempTrackr core initialized");
    Ok(())
}
