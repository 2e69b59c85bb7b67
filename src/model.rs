/// Shared data types for the marine conditions core.
///
/// Everything except `Station` (see `stations.rs`) is created fresh per
/// request and discarded after use; nothing here is persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error taxonomy for the core.
///
/// Only coordinate validation ever reaches the caller of `reconcile` — the
/// HTTP/parse variants are produced by the ingest layer and caught at the
/// fan-out join, where a failed source simply becomes an absent source.
#[derive(Error, Debug)]
pub enum MarconError {
    /// Latitude outside [-90, 90]. Raised before any network call.
    #[error("latitude {0} out of range [-90, 90]")]
    LatitudeOutOfRange(f64),

    /// Longitude outside [-180, 180]. Raised before any network call.
    #[error("longitude {0} out of range [-180, 180]")]
    LongitudeOutOfRange(f64),

    /// HTTP request failed (network, timeout, or non-2xx status).
    #[error("HTTP error: {0}")]
    Http(String),

    /// Response body did not match the expected structure.
    #[error("parse error: {0}")]
    Parse(String),

    /// The request was cancelled before reconciliation completed.
    #[error("request cancelled")]
    Cancelled,
}

// ---------------------------------------------------------------------------
// Samples and series
// ---------------------------------------------------------------------------

/// One authoritative-source observation.
///
/// `qualifier` is only present on extrema ("hi-lo") records, where it names
/// the event kind (e.g. "SLACK", "EXTREMA_FLOOD", "EXTREMA_EBB").
#[derive(Debug, Clone, PartialEq)]
pub struct RawSample {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    pub qualifier: Option<String>,
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

/// Which role a data source filled in a reconciled result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceRole {
    Tide,
    Current,
    Waves,
}

/// Labels which provider supplied which slice of a `ReconciliationResult`,
/// with an explicit warning when modeled data stands in for station data.
#[derive(Debug, Clone, Serialize)]
pub struct SourceDescriptor {
    pub role: SourceRole,
    pub provider: String,
    pub warning: Option<String>,
}

/// Warning attached to the current-data descriptor whenever the open-ocean
/// model is standing in for authoritative station data.
pub const MODELED_DATA_WARNING: &str = "modeled data — not accurate for narrow channels";

/// One reconciled hourly picture for a single request. All arrays are
/// index-aligned to `times` and have identical length.
#[derive(Debug, Clone, Serialize)]
pub struct ReconciliationResult {
    pub times: Vec<DateTime<Utc>>,
    pub tide_heights: Vec<f64>,
    pub current_speeds: Vec<f64>,
    pub current_directions: Vec<f64>,
    pub wave_heights: Vec<f64>,
    pub sea_surface_temps: Vec<f64>,
    /// True when the current-speed series came from the open-ocean model
    /// rather than the authoritative station network.
    pub is_modeled: bool,
    pub sources_used: Vec<SourceDescriptor>,
}

// ---------------------------------------------------------------------------
// Events and windows
// ---------------------------------------------------------------------------

/// Classified marine event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    Slack,
    MaxFlood,
    MaxEbb,
    HighTide,
    LowTide,
}

/// A discrete, human-meaningful marine event with a sub-hour timestamp.
#[derive(Debug, Clone, Serialize)]
pub struct MarineEvent {
    pub time: DateTime<Utc>,
    pub kind: EventKind,
    /// Current speed in knots at the event (0.0 when unknown, e.g. for
    /// tide-only events).
    pub speed: f64,
    /// Current direction in degrees true (0.0 when unknown).
    pub direction: f64,
    pub tide_height: Option<f64>,
}

/// The interval around a slack event during which the current stays below
/// the 0.5 kn safety threshold.
#[derive(Debug, Clone, Serialize)]
pub struct SlackWindow {
    pub slack_time: DateTime<Utc>,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub duration_minutes: i64,
    pub tide_height: f64,
    pub is_high_tide: bool,
    /// Current speed in knots at the slack sample itself.
    pub current_speed: f64,
}
