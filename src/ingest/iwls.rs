/// CHS IWLS (Integrated Water Level System) API client.
///
/// Handles URL construction and JSON response parsing for the per-station
/// time-series endpoint:
///   https://api.iwls-sine.azure.cloud-nuage.canada.ca/api/v1/
///
/// A station's data is addressed by station code plus a series code
/// ("wlp" water level predictions, "wlp-hilo" hi-lo extrema, "wcsp"
/// current speed, "wcsp-extrema" current extrema, ...), bounded by a
/// [from, to] time range. See `fixtures.rs` for annotated payloads.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::model::{MarconError, RawSample};

const IWLS_BASE_URL: &str = "https://api.iwls-sine.azure.cloud-nuage.canada.ca/api/v1";

// ---------------------------------------------------------------------------
// Serde structures for IWLS JSON deserialization
// ---------------------------------------------------------------------------

/// One observation in an IWLS data response. Extrema series additionally
/// carry a qualifier naming the event kind.
#[derive(Deserialize)]
struct IwlsDataPoint {
    #[serde(rename = "eventDate")]
    event_date: String,
    value: f64,
    qualifier: Option<String>,
}

// ---------------------------------------------------------------------------
// URL construction
// ---------------------------------------------------------------------------

/// Builds an IWLS station data URL for the given station code, series
/// code, and UTC time range.
pub fn build_station_data_url(
    station_code: &str,
    series_code: &str,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> String {
    format!(
        "{}/stations/{}/data?time-series-code={}&from={}&to={}",
        IWLS_BASE_URL,
        station_code,
        urlencoding::encode(series_code),
        from.format("%Y-%m-%dT%H:%M:%SZ"),
        to.format("%Y-%m-%dT%H:%M:%SZ"),
    )
}

// ---------------------------------------------------------------------------
// Response parsing
// ---------------------------------------------------------------------------

/// Parses an IWLS data response (a flat JSON array) into `RawSample`s,
/// sorted ascending by timestamp.
///
/// Entries with unparseable timestamps are skipped with a warning rather
/// than failing the whole series. An empty array parses to an empty vec;
/// deciding whether that means "source absent" is the reconciler's job.
///
/// # Errors
/// - `MarconError::Parse` — malformed or structurally unexpected JSON.
pub fn parse_station_data(json: &str) -> Result<Vec<RawSample>, MarconError> {
    let points: Vec<IwlsDataPoint> = serde_json::from_str(json)
        .map_err(|e| MarconError::Parse(format!("IWLS deserialization failed: {}", e)))?;

    let mut samples = Vec::with_capacity(points.len());
    for point in points {
        let timestamp = match DateTime::parse_from_rfc3339(&point.event_date) {
            Ok(dt) => dt.with_timezone(&Utc),
            Err(e) => {
                eprintln!(
                    "Warning: skipping IWLS entry with bad eventDate '{}': {}",
                    point.event_date, e
                );
                continue;
            }
        };

        samples.push(RawSample {
            timestamp,
            value: point.value,
            qualifier: point.qualifier,
        });
    }

    samples.sort_by_key(|s| s.timestamp);
    Ok(samples)
}

// ---------------------------------------------------------------------------
// Fetching
// ---------------------------------------------------------------------------

/// Fetches one time series for a station over the given range.
///
/// # Errors
/// - `MarconError::Http` — network failure, timeout, or non-2xx status.
/// - `MarconError::Parse` — body did not match the expected structure.
pub fn fetch_series(
    client: &reqwest::blocking::Client,
    station_code: &str,
    series_code: &str,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<Vec<RawSample>, MarconError> {
    let url = build_station_data_url(station_code, series_code, from, to);

    let response = client
        .get(&url)
        .header("Accept", "application/json")
        .send()
        .map_err(|e| MarconError::Http(e.to_string()))?;

    if !response.status().is_success() {
        return Err(MarconError::Http(format!(
            "IWLS API error for {}/{}: {}",
            station_code,
            series_code,
            response.status()
        )));
    }

    let body = response
        .text()
        .map_err(|e| MarconError::Http(e.to_string()))?;

    parse_station_data(&body)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
