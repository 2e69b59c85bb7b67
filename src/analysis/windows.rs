/// Slack-water window calculation.
///
/// Around each detected slack, the window is the contiguous stretch where
/// the current stays under the safety threshold. Boundaries are sharpened
/// by linear interpolation between the hourly samples straddling the
/// threshold crossing; when the series starts or ends inside a window the
/// boundary clamps to the series edge.

use chrono::{DateTime, Duration, Utc};

use crate::analysis::events::scan_reversals;
use crate::analysis::events::ReversalKind;
use crate::analysis::hourly::interpolate_extreme_time;
use crate::model::SlackWindow;

/// Currents under this speed (kn) are considered workable.
pub const SAFETY_THRESHOLD_KN: f64 = 0.5;

/// Slack minima at or above this speed are not windows at all.
const SLACK_SPEED_MAX_KN: f64 = 1.0;

/// A tide above `min + 0.75 * (max - min)` over the series counts as high
/// tide for the window.
const HIGH_TIDE_FRACTION: f64 = 0.75;

/// Indices of slack-water minima in an hourly speed series: trend
/// reversals from falling to rising where the speed is under 1.0 kn.
pub fn find_slack_indices(speeds: &[f64]) -> Vec<usize> {
    scan_reversals(speeds)
        .into_iter()
        .filter(|r| r.kind == ReversalKind::Minimum && speeds[r.index] < SLACK_SPEED_MAX_KN)
        .map(|r| r.index)
        .collect()
}

/// Linear interpolation of the threshold-crossing time between adjacent
/// samples `i` and `i + 1`. The fraction is clamped so a degenerate pair
/// (both on the same side of the threshold) still yields a time inside
/// the interval.
fn crossing_time(times: &[DateTime<Utc>], speeds: &[f64], i: usize) -> DateTime<Utc> {
    let span = speeds[i + 1] - speeds[i];
    let fraction = if span.abs() < f64::EPSILON {
        0.0
    } else {
        ((SAFETY_THRESHOLD_KN - speeds[i]) / span).clamp(0.0, 1.0)
    };
    let interval_minutes = (times[i + 1] - times[i]).num_minutes() as f64;
    times[i] + Duration::minutes((fraction * interval_minutes).round() as i64)
}

/// Computes the slack-water window around each slack index.
///
/// `slack_indices` must point at local minima of `speeds` (as returned by
/// `find_slack_indices`). `daylight`, when given as (sunrise, sunset),
/// drops windows whose slack time falls outside it. The result preserves
/// `window_start <= slack_time <= window_end` for every window.
pub fn calculate_slack_windows(
    times: &[DateTime<Utc>],
    speeds: &[f64],
    tide_heights: &[f64],
    slack_indices: &[usize],
    daylight: Option<(DateTime<Utc>, DateTime<Utc>)>,
) -> Vec<SlackWindow> {
    if times.is_empty() || times.len() != speeds.len() {
        return Vec::new();
    }

    // Tide-phase threshold over the whole series, ignoring non-finite
    // entries left by upstream gaps.
    let finite: Vec<f64> = tide_heights.iter().copied().filter(|h| h.is_finite()).collect();
    let high_threshold = match (
        finite.iter().cloned().fold(f64::INFINITY, f64::min),
        finite.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
    ) {
        (min, max) if min.is_finite() && max.is_finite() => {
            Some(min + HIGH_TIDE_FRACTION * (max - min))
        }
        _ => None,
    };

    let mut windows = Vec::new();

    for &i in slack_indices {
        if i >= speeds.len() {
            continue;
        }

        let slack_time = interpolate_extreme_time(times, speeds, i);

        if let Some((sunrise, sunset)) = daylight {
            if slack_time < sunrise || slack_time > sunset {
                continue;
            }
        }

        // Walk back to the last sample still under the threshold.
        let mut start_idx = i;
        while start_idx > 0 && speeds[start_idx - 1] < SAFETY_THRESHOLD_KN {
            start_idx -= 1;
        }
        let window_start = if start_idx == 0 {
            times[0]
        } else {
            crossing_time(times, speeds, start_idx - 1)
        };

        // And forward to the last sample under it.
        let mut end_idx = i;
        while end_idx + 1 < speeds.len() && speeds[end_idx + 1] < SAFETY_THRESHOLD_KN {
            end_idx += 1;
        }
        let window_end = if end_idx + 1 >= speeds.len() {
            times[times.len() - 1]
        } else {
            crossing_time(times, speeds, end_idx)
        };

        // A slack right at threshold can land outside its own crossing
        // pair after interpolation; clamp to keep the ordering invariant.
        let window_start = window_start.min(slack_time);
        let window_end = window_end.max(slack_time);

        let tide_height = tide_heights.get(i).copied().filter(|h| h.is_finite()).unwrap_or(0.0);
        let is_high_tide = high_threshold.map(|t| tide_height > t).unwrap_or(false);

        windows.push(SlackWindow {
            slack_time,
            window_start,
            window_end,
            duration_minutes: (window_end - window_start).num_minutes(),
            tide_height,
            is_high_tide,
            current_speed: speeds[i],
        });
    }

    windows
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
