use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use serde::de::DeserializeOwned;
use serde::Serialize;
use temptrackr_core::{
    AppError, Config, ConfigError, GeocodingError, ReqwestErrorExt, RusqliteErrorExt,
    WeatherError,
};
use temptrackr_store::{KvStore, MemoryStore, NullStore, SqliteStore};
use temptrackr_weather::{
    condition_color, suggest_outfit, weather_icon, Coordinates, FixedGeolocator, ForecastData,
    GeocodingClient, HistoricalWeatherStorage, LocationManager, PositionOptions, WeatherData,
    WeatherPredictor,
};

#[derive(Parser, Debug)]
#[command(name = "temptrackr", version, about = "Weather analytics and location tracking")]
struct Cli {
    /// Where saved locations and history are kept
    #[arg(long, value_enum, default_value_t = StoreKind::Sqlite, global = true)]
    store: StoreKind,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum StoreKind {
    /// SQLite file in the config directory
    Sqlite,
    /// Process memory, discarded on exit
    Memory,
    /// Nothing is stored
    None,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search places by name
    Search { query: String },
    /// Name the place at a coordinate
    Reverse {
        #[arg(allow_negative_numbers = true)]
        lat: f64,
        #[arg(allow_negative_numbers = true)]
        lon: f64,
    },
    /// Report the current position and its place name
    Locate,
    /// Analytics, predictions and severity index for current conditions
    Predict {
        /// WeatherData JSON file
        #[arg(long)]
        weather: PathBuf,
        /// JSON array of ForecastData
        #[arg(long)]
        forecast: Option<PathBuf>,
    },
    /// Store today's snapshot for a location
    Record {
        #[arg(long)]
        weather: PathBuf,
        /// Defaults to the location named in the weather file
        #[arg(long)]
        location: Option<String>,
    },
    /// Stored snapshots for a location, oldest first
    History {
        location: String,
        #[arg(long)]
        days: Option<i64>,
    },
    /// Summary statistics for a location
    Stats {
        location: String,
        #[arg(long)]
        days: Option<i64>,
    },
    /// Saved locations
    Locations {
        #[command(subcommand)]
        action: Option<LocationAction>,
    },
    /// Recently viewed locations
    Recent,
    /// Drop snapshots older than the retention period
    Prune {
        #[arg(long)]
        days: Option<i64>,
    },
    /// Clothing suggestions for current conditions
    Outfit {
        #[arg(long)]
        weather: PathBuf,
    },
    /// Display icon and color class for a condition
    Icon { condition: String },
}

#[derive(Subcommand, Debug)]
enum LocationAction {
    /// List saved locations
    List {
        #[arg(long)]
        favorites: bool,
    },
    /// Save the best match for a search
    Add {
        query: String,
        #[arg(long)]
        favorite: bool,
    },
    Remove { id: String },
    /// Flip the favorite flag
    Favorite { id: String },
}

struct Services {
    config: Config,
    locations: LocationManager,
    history: HistoricalWeatherStorage,
}

fn open_store(kind: StoreKind, config: &Config) -> Result<Arc<dyn KvStore>, AppError> {
    match kind {
        StoreKind::Sqlite => {
            let path = config.database_path();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let store =
                SqliteStore::open(&path).map_err(|e| match e.downcast::<rusqlite::Error>() {
                    Ok(db) => AppError::Database(db.into_database_error()),
                    Err(other) => AppError::Other(other),
                })?;

            tracing::debug!("Using database at {}", path.display());
            Ok(Arc::new(store))
        }
        StoreKind::Memory => Ok(Arc::new(MemoryStore::new())),
        StoreKind::None => Ok(Arc::new(NullStore)),
    }
}

fn build_services(kind: StoreKind) -> Result<Services, AppError> {
    let config = Config::load().map_err(|e| ConfigError::ParseError(format!("{:#}", e)))?;

    let validation = config.validate();
    if !validation.is_valid() {
        return Err(ConfigError::Invalid(validation.error_summary()).into());
    }
    for warning in &validation.warnings {
        tracing::warn!("Config warning: {}", warning);
    }

    let store = open_store(kind, &config)?;

    let geocoder = GeocodingClient::new(temptrackr_weather::GeocodingConfig {
        base_url: config.geocoding.base_url.clone(),
        api_key: config.geocoding.api_key.clone(),
        timeout: Duration::from_secs(config.geocoding.request_timeout_secs),
        search_limit: config.geocoding.search_limit,
    })
    .map_err(|e| match e {
        temptrackr_weather::WeatherError::Network(e) => AppError::Network(e.into_network_error()),
        other => AppError::Other(other.into()),
    })?;

    let mut locations = LocationManager::new(store.clone(), geocoder).with_position_options(
        PositionOptions {
            high_accuracy: true,
            timeout: Duration::from_secs(config.location.timeout_secs),
        },
    );
    if let Some(home) = config.location.home {
        locations = locations.with_geolocator(Arc::new(FixedGeolocator::new(Coordinates::new(
            home.lat, home.lon,
        ))));
    }

    let history = HistoricalWeatherStorage::new(store).with_max_entries(config.history.max_entries);

    Ok(Services {
        config,
        locations,
        history,
    })
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, AppError> {
    let raw = std::fs::read_to_string(path)?;
    serde_json::from_str(&raw)
        .map_err(|e| WeatherError::InvalidData(format!("{}: {}", path.display(), e)).into())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), AppError> {
    let out = serde_json::to_string_pretty(value).map_err(|e| AppError::Other(e.into()))?;
    println!("{}", out);
    Ok(())
}

async fn run(cli: Cli) -> Result<(), AppError> {
    if let Command::Icon { condition } = &cli.command {
        return print_json(&serde_json::json!({
            "condition": condition,
            "icon": weather_icon(condition),
            "color": condition_color(condition),
        }));
    }

    let services = build_services(cli.store)?;
    let Services {
        config,
        locations,
        history,
    } = &services;

    match cli.command {
        Command::Search { query } => {
            let hits = locations.search_locations(&query).await;
            print_json(&hits)
        }
        Command::Reverse { lat, lon } => {
            let name = locations
                .reverse_geocode(lat, lon)
                .await
                .ok_or_else(|| GeocodingError::NotFound(format!("{}, {}", lat, lon)))?;
            print_json(&serde_json::json!({ "lat": lat, "lon": lon, "name": name }))
        }
        Command::Locate => {
            let coords = locations
                .get_current_location()
                .await
                .ok_or(GeocodingError::PositionUnavailable)?;
            let name = locations.reverse_geocode(coords.lat, coords.lon).await;
            print_json(&serde_json::json!({ "coordinates": coords, "name": name }))
        }
        Command::Predict { weather, forecast } => {
            let current: WeatherData = read_json(&weather)?;
            let forecast: Vec<ForecastData> = match forecast {
                Some(path) => read_json(&path)?,
                None => Vec::new(),
            };

            print_json(&serde_json::json!({
                "analytics": WeatherPredictor::analyze(&current, &forecast),
                "airQuality": WeatherPredictor::predict_air_quality(&current, &forecast),
                "predictions": WeatherPredictor::generate_predictions(&current, &forecast),
                "severityIndex": WeatherPredictor::calculate_severity_index(&current, &forecast),
            }))
        }
        Command::Record { weather, location } => {
            let current: WeatherData = read_json(&weather)?;
            let location = location.unwrap_or_else(|| current.location.clone());

            history.store_weather_data(&location, &current);
            locations.add_to_recent(&location);
            tracing::info!("Recorded snapshot for {}", location);
            Ok(())
        }
        Command::History { location, days } => {
            let days = days.unwrap_or(config.history.window_days);
            print_json(&history.get_historical_data(&location, days))
        }
        Command::Stats { location, days } => {
            let days = days.unwrap_or(config.history.window_days);
            let stats = history
                .get_location_stats(&location, days)
                .ok_or(WeatherError::NoHistory(location))?;
            print_json(&stats)
        }
        Command::Locations { action } => {
            match action.unwrap_or(LocationAction::List { favorites: false }) {
                LocationAction::List { favorites: true } => {
                    print_json(&locations.get_favorite_locations())
                }
                LocationAction::List { favorites: false } => {
                    print_json(&locations.get_saved_locations())
                }
                LocationAction::Add { query, favorite } => {
                    let best = locations
                        .search_locations(&query)
                        .await
                        .into_iter()
                        .next()
                        .ok_or(GeocodingError::NotFound(query))?;

                    let mut new_location: temptrackr_weather::NewLocation = best.into();
                    new_location.is_favorite = favorite;
                    print_json(&locations.save_location(new_location))
                }
                LocationAction::Remove { id } => {
                    locations.remove_location(&id);
                    Ok(())
                }
                LocationAction::Favorite { id } => {
                    locations.toggle_favorite(&id);
                    Ok(())
                }
            }
        }
        Command::Recent => print_json(&locations.get_recent_locations()),
        Command::Prune { days } => {
            history.clear_old_data(days.unwrap_or(config.history.retention_days));
            Ok(())
        }
        Command::Outfit { weather } => {
            let current: WeatherData = read_json(&weather)?;
            print_json(&suggest_outfit(&current))
        }
        Command::Icon { .. } => Ok(()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    temptrackr_core::init()?;

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        tracing::error!("{}", e);
        eprintln!("{}", e.user_message());
        std::process::exit(1);
    }

    Ok(())
}
