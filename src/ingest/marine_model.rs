/// Open-ocean marine model API client (Open-Meteo Marine style).
///
/// Retrieves hourly forecast arrays — current velocity/direction, wave
/// height/period, sea surface temperature, and sea level — addressed by
/// latitude/longitude. This is the fallback source when station-specific
/// authoritative data is absent or implausible; being an open-ocean model
/// it systematically under-predicts currents in narrow channels, which is
/// why reconciled results flag it with a warning label.
///
/// API Documentation: https://open-meteo.com/en/docs/marine-weather-api

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;

use crate::model::MarconError;

const MODEL_BASE_URL: &str = "https://marine-api.open-meteo.com/v1/marine";

/// The model reports current velocity in km/h; the rest of the core works
/// in knots.
const KMH_PER_KNOT: f64 = 1.852;

// ---------------------------------------------------------------------------
// Serde structures
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct ModelResponse {
    hourly: ModelHourly,
}

/// Parallel hourly arrays. Every field except `time` may be absent or
/// contain nulls where the model has no value.
#[derive(Deserialize)]
struct ModelHourly {
    time: Vec<String>,
    ocean_current_velocity: Option<Vec<Option<f64>>>,
    ocean_current_direction: Option<Vec<Option<f64>>>,
    wave_height: Option<Vec<Option<f64>>>,
    sea_surface_temperature: Option<Vec<Option<f64>>>,
    sea_level_height_msl: Option<Vec<Option<f64>>>,
}

// ---------------------------------------------------------------------------
// Parsed forecast
// ---------------------------------------------------------------------------

/// One parsed model forecast. All arrays have the same length as `times`;
/// missing model values are zero-filled.
#[derive(Debug, Clone)]
pub struct ModelForecast {
    pub times: Vec<DateTime<Utc>>,
    /// Current speed in knots (converted from the model's km/h).
    pub current_speeds: Vec<f64>,
    /// Current direction in degrees true.
    pub current_directions: Vec<f64>,
    pub wave_heights: Vec<f64>,
    pub sea_surface_temps: Vec<f64>,
    /// Sea level relative to mean sea level, the tide-height fallback.
    pub sea_levels: Vec<f64>,
}

// ---------------------------------------------------------------------------
// URL construction
// ---------------------------------------------------------------------------

/// Builds a marine model forecast URL for the given coordinates. Times are
/// requested in UTC so they align with IWLS timestamps without conversion.
pub fn build_forecast_url(latitude: f64, longitude: f64, forecast_days: u8) -> String {
    format!(
        "{}?latitude={}&longitude={}&hourly={}&timezone=UTC&forecast_days={}",
        MODEL_BASE_URL,
        latitude,
        longitude,
        "ocean_current_velocity,ocean_current_direction,wave_height,sea_surface_temperature,sea_level_height_msl",
        forecast_days,
    )
}

// ---------------------------------------------------------------------------
// Response parsing
// ---------------------------------------------------------------------------

/// Zero-fills an optional hourly array to exactly `len` entries.
fn fill_series(values: Option<Vec<Option<f64>>>, len: usize) -> Vec<f64> {
    let mut out: Vec<f64> = values
        .unwrap_or_default()
        .into_iter()
        .map(|v| v.unwrap_or(0.0))
        .collect();
    out.resize(len, 0.0);
    out
}

/// Parses a model forecast response into equal-length hourly arrays.
///
/// # Errors
/// - `MarconError::Parse` — malformed JSON or an unparseable time entry.
pub fn parse_forecast(json: &str) -> Result<ModelForecast, MarconError> {
    let response: ModelResponse = serde_json::from_str(json)
        .map_err(|e| MarconError::Parse(format!("model deserialization failed: {}", e)))?;

    let hourly = response.hourly;
    let len = hourly.time.len();

    let mut times = Vec::with_capacity(len);
    for entry in &hourly.time {
        // Open-Meteo emits "YYYY-MM-DDTHH:MM" without an offset when a
        // timezone is requested; we always request UTC.
        let naive = NaiveDateTime::parse_from_str(entry, "%Y-%m-%dT%H:%M")
            .map_err(|e| MarconError::Parse(format!("bad model time '{}': {}", entry, e)))?;
        times.push(naive.and_utc());
    }

    let current_speeds = fill_series(hourly.ocean_current_velocity, len)
        .into_iter()
        .map(|kmh| kmh / KMH_PER_KNOT)
        .collect();

    Ok(ModelForecast {
        times,
        current_speeds,
        current_directions: fill_series(hourly.ocean_current_direction, len),
        wave_heights: fill_series(hourly.wave_height, len),
        sea_surface_temps: fill_series(hourly.sea_surface_temperature, len),
        sea_levels: fill_series(hourly.sea_level_height_msl, len),
    })
}

// ---------------------------------------------------------------------------
// Fetching
// ---------------------------------------------------------------------------

/// Fetches the hourly marine forecast for a location.
///
/// # Errors
/// - `MarconError::Http` — network failure, timeout, or non-2xx status.
/// - `MarconError::Parse` — body did not match the expected structure.
pub fn fetch_forecast(
    client: &reqwest::blocking::Client,
    latitude: f64,
    longitude: f64,
    forecast_days: u8,
) -> Result<ModelForecast, MarconError> {
    let url = build_forecast_url(latitude, longitude, forecast_days);

    let response = client
        .get(&url)
        .header("Accept", "application/json")
        .send()
        .map_err(|e| MarconError::Http(e.to_string()))?;

    if !response.status().is_success() {
        return Err(MarconError::Http(format!(
            "marine model API error: {}",
            response.status()
        )));
    }

    let body = response
        .text()
        .map_err(|e| MarconError::Http(e.to_string()))?;

    parse_forecast(&body)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
