/// Hourly grid alignment and sub-sample extremum interpolation.
///
/// Station data arrives with irregular timestamps (predictions on odd
/// minutes, extrema wherever they fall); the model data defines a regular
/// hourly axis. `map_to_hourly` reconciles the two by nearest-neighbor
/// matching; `interpolate_extreme_time` recovers sub-hour timing for an
/// extremum found at a discrete hourly index.

use chrono::{DateTime, Duration, Utc};

use crate::model::RawSample;

/// Maximum allowed gap between an hourly grid point and its nearest
/// station sample. Beyond this the hour gets the 0.0 sentinel ("no
/// authoritative data at this hour").
const MAX_MATCH_GAP_MINUTES: i64 = 45;

/// Flat/degenerate parabola guard for the vertex formula.
const VERTEX_EPSILON: f64 = 1e-6;

// ---------------------------------------------------------------------------
// Hourly series mapper
// ---------------------------------------------------------------------------

/// Aligns irregular `samples` onto the `hourly_times` axis.
///
/// For each grid point, the sample with the minimum absolute time
/// difference supplies the value if it lies within 45 minutes; otherwise
/// the entry is 0.0. Output length always equals `hourly_times.len()`.
///
/// Pure function; the quadratic scan is fine at the expected series sizes
/// (≤ ~200 points).
pub fn map_to_hourly(hourly_times: &[DateTime<Utc>], samples: &[RawSample]) -> Vec<f64> {
    hourly_times
        .iter()
        .map(|hour| {
            samples
                .iter()
                .map(|s| ((s.timestamp - *hour).num_seconds().abs(), s.value))
                .min_by_key(|(gap, _)| *gap)
                .filter(|(gap, _)| *gap <= MAX_MATCH_GAP_MINUTES * 60)
                .map(|(_, value)| value)
                .unwrap_or(0.0)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Extremum interpolator
// ---------------------------------------------------------------------------

/// Sharpens the timestamp of a local extremum found at `index` by fitting
/// a parabola through the sample and its two neighbors.
///
/// With equally spaced samples `y1, y2, y3` centered on the extremum, the
/// vertex sits at `-(y3 - y1) / (2*(y1 + y3 - 2*y2))` sample intervals
/// from the center. The offset is clamped to ±0.5 intervals so the result
/// never leaves the neighborhood of `index`, and the returned time is
/// rounded to whole minutes.
///
/// Boundary rule: at the first or last element there is no neighbor pair,
/// so `times[index]` is returned unchanged.
pub fn interpolate_extreme_time(
    times: &[DateTime<Utc>],
    values: &[f64],
    index: usize,
) -> DateTime<Utc> {
    if index == 0 || index + 1 >= times.len() || index >= values.len() {
        return times[index];
    }

    let y1 = values[index - 1];
    let y2 = values[index];
    let y3 = values[index + 1];

    let denominator = 2.0 * (y1 + y3 - 2.0 * y2);
    let offset = if denominator.abs() < VERTEX_EPSILON {
        0.0
    } else {
        (-(y3 - y1) / denominator).clamp(-0.5, 0.5)
    };

    let interval_minutes = (times[index + 1] - times[index]).num_minutes() as f64;
    let shift = (offset * interval_minutes).round() as i64;

    times[index] + Duration::minutes(shift)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
