//! Heuristic analytics and prediction cards derived from current conditions
//! and the daily forecast.
//!
//! Everything here is a pure function of its inputs: no I/O, no clock, no
//! randomness. Insufficient input yields a neutral result instead of an error.

use serde::{Deserialize, Serialize};

use crate::types::{ForecastData, WeatherData};

/// Standard sea-level pressure (hPa)
pub const NORMAL_PRESSURE_HPA: f64 = 1013.25;

/// Minimum forecast length for a temperature regression
pub const MIN_TREND_POINTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureDirection {
    Warming,
    Cooling,
    Stable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    Light,
    Moderate,
    Heavy,
}

impl Intensity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Moderate => "moderate",
            Self::Heavy => "heavy",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PressureTrend {
    Rising,
    Falling,
    Stable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrengthTrend {
    Increasing,
    Decreasing,
    Stable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AqiCategory {
    Good,
    Moderate,
    Unhealthy,
}

impl AqiCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::Moderate => "Moderate",
            Self::Unhealthy => "Unhealthy",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionType {
    Temperature,
    Precipitation,
    Pressure,
    Wind,
    AirQuality,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

/// Regression over daily mean temperatures
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemperatureTrend {
    pub direction: TemperatureDirection,
    /// Absolute slope, °C per day
    pub rate: f64,
    pub confidence: u8,
}

impl TemperatureTrend {
    pub fn neutral() -> Self {
        Self {
            direction: TemperatureDirection::Stable,
            rate: 0.0,
            confidence: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrecipitationRisk {
    /// Percent, rounded, at most 95
    pub probability: u8,
    pub intensity: Intensity,
    pub timeframe: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PressureAnalysis {
    pub trend: PressureTrend,
    /// Absolute deviation from standard pressure, hPa
    pub rate: f64,
    pub weather_implication: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindAnalysis {
    pub gust_probability: u8,
    pub direction_stability: u8,
    pub strength_trend: StrengthTrend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirQualityPrediction {
    pub aqi: u16,
    pub category: AqiCategory,
    pub confidence: u8,
    pub trend: Trend,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherAnalytics {
    pub temperature_trend: TemperatureTrend,
    pub precipitation_risk: PrecipitationRisk,
    pub pressure_analysis: PressureAnalysis,
    pub wind_analysis: WindAnalysis,
}

/// One prediction card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    #[serde(rename = "type")]
    pub kind: PredictionType,
    pub title: String,
    pub description: String,
    pub confidence: u8,
    pub severity: Severity,
    pub value: String,
    pub trend: Trend,
    pub timeframe: String,
}

fn is_rainy(day: &ForecastData) -> bool {
    let condition = day.condition.to_lowercase();
    condition.contains("rain") || condition.contains("storm")
}

/// Air-quality washout counts rain only
fn has_rain(day: &ForecastData) -> bool {
    day.condition.to_lowercase().contains("rain")
}

fn rainy_days(forecast: &[ForecastData]) -> usize {
    forecast.iter().filter(|d| is_rainy(d)).count()
}

/// Graded severity: `high` above `high_above`, `medium` above `medium_above`
fn grade(value: f64, medium_above: f64, high_above: f64) -> Severity {
    if value > high_above {
        Severity::High
    } else if value > medium_above {
        Severity::Medium
    } else {
        Severity::Low
    }
}

/// Stateless prediction engine
pub struct WeatherPredictor;

impl WeatherPredictor {
    /// Least-squares slope of daily mean temperature against day index.
    ///
    /// Fewer than three days yields the neutral trend.
    pub fn analyze_temperature_trend(forecast: &[ForecastData]) -> TemperatureTrend {
        if forecast.len() < MIN_TREND_POINTS {
            return TemperatureTrend::neutral();
        }

        let n = forecast.len() as f64;
        let (mut sum_x, mut sum_y, mut sum_xy, mut sum_xx) = (0.0, 0.0, 0.0, 0.0);
        for (i, day) in forecast.iter().enumerate() {
            let x = i as f64;
            let y = day.mean_temperature();
            sum_x += x;
            sum_y += y;
            sum_xy += x * y;
            sum_xx += x * x;
        }

        let slope = (n * sum_xy - sum_x * sum_y) / (n * sum_xx - sum_x * sum_x);
        let confidence = (slope.abs() * 20.0).min(95.0).round() as u8;

        let direction = if slope > 0.5 {
            TemperatureDirection::Warming
        } else if slope < -0.5 {
            TemperatureDirection::Cooling
        } else {
            TemperatureDirection::Stable
        };

        TemperatureTrend {
            direction,
            rate: slope.abs(),
            confidence,
        }
    }

    /// Precipitation probability from humidity, pressure and rainy forecast days
    pub fn analyze_precipitation_risk(
        current: &WeatherData,
        forecast: &[ForecastData],
    ) -> PrecipitationRisk {
        let humidity_factor = f64::from(current.humidity) / 100.0;
        let pressure_factor = if f64::from(current.pressure) < 1013.0 {
            1.2
        } else {
            0.8
        };

        let rainy = rainy_days(forecast);
        let base = (humidity_factor * 0.6 + pressure_factor * 0.4) * 100.0;
        let forecast_boost = if forecast.is_empty() {
            0.0
        } else {
            rainy as f64 / forecast.len() as f64 * 50.0
        };

        let probability = (base + forecast_boost).min(95.0);

        let intensity = if probability > 70.0 {
            Intensity::Heavy
        } else if probability > 40.0 {
            Intensity::Moderate
        } else {
            Intensity::Light
        };

        let timeframe = if rainy > 0 { "24-48 hours" } else { "3-5 days" };

        PrecipitationRisk {
            probability: probability.round() as u8,
            intensity,
            timeframe: timeframe.to_string(),
        }
    }

    /// Classify pressure against the standard atmosphere (±5 hPa, strict)
    pub fn analyze_pressure(current: &WeatherData) -> PressureAnalysis {
        let pressure = f64::from(current.pressure);

        let (trend, implication) = if pressure > NORMAL_PRESSURE_HPA + 5.0 {
            (PressureTrend::Rising, "Clear, stable weather expected")
        } else if pressure < NORMAL_PRESSURE_HPA - 5.0 {
            (PressureTrend::Falling, "Unsettled weather, possible storms")
        } else {
            (PressureTrend::Stable, "Weather conditions remain steady")
        };

        PressureAnalysis {
            trend,
            rate: (pressure - NORMAL_PRESSURE_HPA).abs(),
            weather_implication: implication.to_string(),
        }
    }

    /// Gust risk and stability from current wind; trend from forecast average
    pub fn analyze_wind(current: &WeatherData, forecast: &[ForecastData]) -> WindAnalysis {
        let current_wind = f64::from(current.wind_speed);
        let avg_forecast_wind = if forecast.is_empty() {
            current_wind
        } else {
            forecast
                .iter()
                .map(|f| f64::from(f.wind_speed))
                .sum::<f64>()
                / forecast.len() as f64
        };

        let gust_probability = if current_wind > 25.0 {
            80
        } else if current_wind > 15.0 {
            50
        } else {
            20
        };

        let direction_stability = if current_wind < 10.0 {
            90
        } else if current_wind < 20.0 {
            70
        } else {
            40
        };

        let strength_trend = if avg_forecast_wind > current_wind + 5.0 {
            StrengthTrend::Increasing
        } else if avg_forecast_wind < current_wind - 5.0 {
            StrengthTrend::Decreasing
        } else {
            StrengthTrend::Stable
        };

        WindAnalysis {
            gust_probability,
            direction_stability,
            strength_trend,
        }
    }

    /// Simplified air-quality index from dispersion, washout and inversion cues
    pub fn predict_air_quality(
        current: &WeatherData,
        forecast: &[ForecastData],
    ) -> AirQualityPrediction {
        let mut aqi: i32 = 45;

        if current.wind_speed < 5 {
            aqi += 20;
        } else if current.wind_speed > 15 {
            aqi -= 10;
        }

        let rain_expected = forecast.iter().any(has_rain);
        if rain_expected {
            aqi -= 15;
        }

        if current.pressure > 1020 {
            aqi += 10;
        }

        if current.humidity > 80 {
            aqi += 5;
        }

        let aqi = aqi.clamp(15, 150);

        let category = if aqi <= 50 {
            AqiCategory::Good
        } else if aqi <= 100 {
            AqiCategory::Moderate
        } else {
            AqiCategory::Unhealthy
        };

        let trend = if rain_expected {
            Trend::Down
        } else if current.wind_speed < 5 {
            Trend::Up
        } else {
            Trend::Stable
        };

        AirQualityPrediction {
            aqi: aqi as u16,
            category,
            confidence: 75,
            trend,
        }
    }

    /// Run the four analyzers
    pub fn analyze(current: &WeatherData, forecast: &[ForecastData]) -> WeatherAnalytics {
        WeatherAnalytics {
            temperature_trend: Self::analyze_temperature_trend(forecast),
            precipitation_risk: Self::analyze_precipitation_risk(current, forecast),
            pressure_analysis: Self::analyze_pressure(current),
            wind_analysis: Self::analyze_wind(current, forecast),
        }
    }

    /// Five prediction cards, always in the order temperature, precipitation,
    /// pressure, wind, air quality.
    pub fn generate_predictions(
        current: &WeatherData,
        forecast: &[ForecastData],
    ) -> Vec<PredictionResult> {
        let analytics = Self::analyze(current, forecast);
        let air_quality = Self::predict_air_quality(current, forecast);

        let temp = &analytics.temperature_trend;
        let (pattern, sign, temp_trend) = match temp.direction {
            TemperatureDirection::Warming => ("Rising", "+", Trend::Up),
            TemperatureDirection::Cooling => ("Falling", "-", Trend::Down),
            TemperatureDirection::Stable => ("Stable", "±", Trend::Stable),
        };

        let precip = &analytics.precipitation_risk;
        let pressure = &analytics.pressure_analysis;
        let wind = &analytics.wind_analysis;

        vec![
            PredictionResult {
                kind: PredictionType::Temperature,
                title: "Temperature Trend".to_string(),
                description: format!("{} temperature pattern detected", pattern),
                confidence: temp.confidence,
                severity: grade(temp.rate, 1.0, 2.0),
                value: format!("{}{:.1}°C/day", sign, temp.rate),
                trend: temp_trend,
                timeframe: "Next 5 days".to_string(),
            },
            PredictionResult {
                kind: PredictionType::Precipitation,
                title: "Precipitation Forecast".to_string(),
                description: format!("{} precipitation expected", precip.intensity.as_str()),
                confidence: precip.probability,
                severity: grade(f64::from(precip.probability), 40.0, 70.0),
                value: format!("{}% chance", precip.probability),
                trend: if precip.probability > 50 {
                    Trend::Up
                } else {
                    Trend::Down
                },
                timeframe: precip.timeframe.clone(),
            },
            PredictionResult {
                kind: PredictionType::Pressure,
                title: "Atmospheric Pressure".to_string(),
                description: pressure.weather_implication.clone(),
                confidence: 85,
                severity: grade(pressure.rate, 5.0, 10.0),
                value: format!("{} hPa", current.pressure),
                trend: match pressure.trend {
                    PressureTrend::Rising => Trend::Up,
                    PressureTrend::Falling => Trend::Down,
                    PressureTrend::Stable => Trend::Stable,
                },
                timeframe: "Current conditions".to_string(),
            },
            PredictionResult {
                kind: PredictionType::Wind,
                title: "Wind Analysis".to_string(),
                description: format!(
                    "Wind gusts {}",
                    if wind.gust_probability > 60 {
                        "likely"
                    } else {
                        "possible"
                    }
                ),
                confidence: wind.direction_stability,
                severity: grade(f64::from(wind.gust_probability), 40.0, 70.0),
                value: format!("{}% gust risk", wind.gust_probability),
                trend: match wind.strength_trend {
                    StrengthTrend::Increasing => Trend::Up,
                    StrengthTrend::Decreasing => Trend::Down,
                    StrengthTrend::Stable => Trend::Stable,
                },
                timeframe: "Next 24 hours".to_string(),
            },
            PredictionResult {
                kind: PredictionType::AirQuality,
                title: "Air Quality Index".to_string(),
                description: format!(
                    "Air quality expected to be {}",
                    air_quality.category.as_str().to_lowercase()
                ),
                confidence: air_quality.confidence,
                severity: grade(f64::from(air_quality.aqi), 50.0, 100.0),
                value: format!("{} ({})", air_quality.category.as_str(), air_quality.aqi),
                trend: air_quality.trend,
                timeframe: "Tomorrow".to_string(),
            },
        ]
    }

    /// Composite 0-100 risk score from temperature extremes, wind,
    /// precipitation and low pressure.
    pub fn calculate_severity_index(current: &WeatherData, forecast: &[ForecastData]) -> u8 {
        let mut severity: u32 = 0;

        if !forecast.is_empty() {
            let avg_high = forecast.iter().map(|f| f.high).sum::<f64>() / forecast.len() as f64;
            if avg_high > 35.0 || avg_high < -10.0 {
                severity += 30;
            } else if avg_high > 30.0 || avg_high < 0.0 {
                severity += 15;
            }
        }

        if current.wind_speed > 50 {
            severity += 40;
        } else if current.wind_speed > 25 {
            severity += 20;
        }

        let precip = Self::analyze_precipitation_risk(current, forecast);
        if precip.probability > 80 && precip.intensity == Intensity::Heavy {
            severity += 35;
        } else if precip.probability > 60 {
            severity += 20;
        }

        if current.pressure < 990 {
            severity += 25;
        } else if current.pressure < 1000 {
            severity += 15;
        }

        severity.min(100) as u8
    }
}
