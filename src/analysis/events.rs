/// Marine event classification.
///
/// Two modes, chosen by data availability. When the station network
/// publishes extrema records ("hi-lo data") they are mapped directly via
/// their qualifiers. When it doesn't, the hourly series are scanned for
/// trend reversals — the successive-difference scan that also backs the
/// slack-window calculator. Every reversal index passes through the
/// extremum interpolator so event timestamps carry sub-hour precision
/// even though the source series is hourly.

use chrono::{DateTime, Duration, Utc};

use crate::analysis::hourly::interpolate_extreme_time;
use crate::model::{EventKind, MarineEvent, RawSample};

/// Differences smaller than this do not establish or change a trend.
pub const TREND_EPSILON: f64 = 0.001;

/// A current minimum only counts as slack water below this speed (kn).
const SLACK_SPEED_MAX_KN: f64 = 1.0;

/// Qualifier-less extrema records at or below this magnitude are slack.
const SLACK_MAGNITUDE_KN: f64 = 0.1;

/// Flood sector: current direction within [45°, 135°] is flood, anything
/// else ebb. A fixed band that assumes the local channel orientation —
/// kept as-is until station-specific calibration data exists.
const FLOOD_DIRECTION_MIN_DEG: f64 = 45.0;
const FLOOD_DIRECTION_MAX_DEG: f64 = 135.0;

/// Classified events are limited to this look-ahead from "now".
pub const LOOKAHEAD_HOURS: i64 = 48;

// ---------------------------------------------------------------------------
// Trend-reversal scanning
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReversalKind {
    /// Falling-to-rising reversal (local minimum).
    Minimum,
    /// Rising-to-falling reversal (local maximum).
    Maximum,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Reversal {
    pub index: usize,
    pub kind: ReversalKind,
}

#[derive(Clone, Copy, PartialEq)]
enum Trend {
    Rising,
    Falling,
}

/// Scans a chronological series for trend reversals.
///
/// Differences within `TREND_EPSILON` leave the current trend in place, so
/// a flat shelf between a fall and a rise still reads as one reversal, at
/// the sample where the new trend begins. Minima and maxima strictly
/// alternate by construction, which is what guarantees the no-adjacent-
/// slack property of classified lists.
pub(crate) fn scan_reversals(values: &[f64]) -> Vec<Reversal> {
    let mut reversals = Vec::new();
    let mut trend: Option<Trend> = None;

    for i in 1..values.len() {
        let diff = values[i] - values[i - 1];
        if diff.abs() <= TREND_EPSILON {
            continue;
        }
        let next = if diff > 0.0 { Trend::Rising } else { Trend::Falling };

        match trend {
            Some(Trend::Falling) if next == Trend::Rising => reversals.push(Reversal {
                index: i - 1,
                kind: ReversalKind::Minimum,
            }),
            Some(Trend::Rising) if next == Trend::Falling => reversals.push(Reversal {
                index: i - 1,
                kind: ReversalKind::Maximum,
            }),
            _ => {}
        }
        trend = Some(next);
    }

    reversals
}

fn is_flood_direction(direction: f64) -> bool {
    (FLOOD_DIRECTION_MIN_DEG..=FLOOD_DIRECTION_MAX_DEG).contains(&direction)
}

/// Manual-mode current events: slack at sub-1.0 kn minima, max flood/ebb
/// at maxima, disambiguated by the direction angle at that index.
pub fn scan_current_events(
    times: &[DateTime<Utc>],
    speeds: &[f64],
    directions: &[f64],
    tide_heights: &[f64],
) -> Vec<MarineEvent> {
    scan_reversals(speeds)
        .into_iter()
        .filter_map(|reversal| {
            let i = reversal.index;
            let kind = match reversal.kind {
                ReversalKind::Minimum => {
                    if speeds[i] >= SLACK_SPEED_MAX_KN {
                        return None; // a lull, not slack water
                    }
                    EventKind::Slack
                }
                ReversalKind::Maximum => {
                    if is_flood_direction(directions.get(i).copied().unwrap_or(0.0)) {
                        EventKind::MaxFlood
                    } else {
                        EventKind::MaxEbb
                    }
                }
            };
            Some(MarineEvent {
                time: interpolate_extreme_time(times, speeds, i),
                kind,
                speed: speeds[i],
                direction: directions.get(i).copied().unwrap_or(0.0),
                tide_height: tide_heights.get(i).copied(),
            })
        })
        .collect()
}

/// Manual-mode tide events: the same reversal scan applied to tide height
/// yields high/low tide when authoritative hi-lo data is absent.
pub fn scan_tide_events(times: &[DateTime<Utc>], heights: &[f64]) -> Vec<MarineEvent> {
    scan_reversals(heights)
        .into_iter()
        .map(|reversal| {
            let i = reversal.index;
            let kind = match reversal.kind {
                ReversalKind::Maximum => EventKind::HighTide,
                ReversalKind::Minimum => EventKind::LowTide,
            };
            MarineEvent {
                time: interpolate_extreme_time(times, heights, i),
                kind,
                speed: 0.0,
                direction: 0.0,
                tide_height: Some(heights[i]),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Authoritative mode
// ---------------------------------------------------------------------------

/// Maps authoritative current-extrema records to events.
///
/// Records carrying a qualifier map directly; without one, the signed
/// value decides: magnitude ≤ 0.1 kn is slack, positive is max flood,
/// negative is max ebb.
pub fn classify_current_extrema(records: &[RawSample]) -> Vec<MarineEvent> {
    records
        .iter()
        .filter_map(|record| {
            let kind = match record.qualifier.as_deref() {
                Some("SLACK") => EventKind::Slack,
                Some("EXTREMA_FLOOD") => EventKind::MaxFlood,
                Some("EXTREMA_EBB") => EventKind::MaxEbb,
                Some(other) => {
                    eprintln!("Warning: unknown current extrema qualifier '{}'", other);
                    return None;
                }
                None => {
                    if record.value.abs() <= SLACK_MAGNITUDE_KN {
                        EventKind::Slack
                    } else if record.value > 0.0 {
                        EventKind::MaxFlood
                    } else {
                        EventKind::MaxEbb
                    }
                }
            };
            Some(MarineEvent {
                time: record.timestamp,
                kind,
                speed: record.value.abs(),
                direction: 0.0,
                tide_height: None,
            })
        })
        .collect()
}

/// Maps authoritative hi-lo water level records to high/low tide events.
///
/// Qualified records ("HIGH"/"LOW") map directly; unqualified ones are
/// classified by comparing each record to its neighbors (hi-lo series
/// alternate, so a record above both neighbors is a high). A lone record
/// falls back to comparison against the list mean.
pub fn classify_tide_hilo(records: &[RawSample]) -> Vec<MarineEvent> {
    let mean = if records.is_empty() {
        0.0
    } else {
        records.iter().map(|r| r.value).sum::<f64>() / records.len() as f64
    };

    records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let kind = match record.qualifier.as_deref() {
                Some("HIGH") => EventKind::HighTide,
                Some("LOW") => EventKind::LowTide,
                _ => {
                    let prev = i.checked_sub(1).map(|p| records[p].value);
                    let next = records.get(i + 1).map(|n| n.value);
                    let is_high = match (prev, next) {
                        (Some(p), Some(n)) => record.value > p && record.value > n,
                        (Some(p), None) => record.value > p,
                        (None, Some(n)) => record.value > n,
                        (None, None) => record.value > mean,
                    };
                    if is_high { EventKind::HighTide } else { EventKind::LowTide }
                }
            };
            MarineEvent {
                time: record.timestamp,
                kind,
                speed: 0.0,
                direction: 0.0,
                tide_height: Some(record.value),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Mode selection and merge
// ---------------------------------------------------------------------------

/// Everything the classifier can draw on for one request. The hourly
/// arrays are index-aligned; the extrema lists are raw event records and
/// may be empty when a station doesn't publish them.
pub struct EventSources<'a> {
    pub times: &'a [DateTime<Utc>],
    pub current_speeds: &'a [f64],
    pub current_directions: &'a [f64],
    pub tide_heights: &'a [f64],
    pub current_extrema: &'a [RawSample],
    pub tide_extrema: &'a [RawSample],
}

/// Classifies all marine events for a request: authoritative extrema when
/// present, trend-reversal scanning otherwise, independently for currents
/// and tides. The merged list is returned as a fresh sorted vec limited
/// to a 48-hour look-ahead from `now`.
pub fn classify_events(sources: &EventSources, now: DateTime<Utc>) -> Vec<MarineEvent> {
    let current_events = if sources.current_extrema.is_empty() {
        scan_current_events(
            sources.times,
            sources.current_speeds,
            sources.current_directions,
            sources.tide_heights,
        )
    } else {
        classify_current_extrema(sources.current_extrema)
    };

    let tide_events = if sources.tide_extrema.is_empty() {
        scan_tide_events(sources.times, sources.tide_heights)
    } else {
        classify_tide_hilo(sources.tide_extrema)
    };

    let horizon = now + Duration::hours(LOOKAHEAD_HOURS);
    let mut events: Vec<MarineEvent> = current_events
        .into_iter()
        .chain(tide_events)
        .filter(|e| e.time >= now && e.time <= horizon)
        .collect();
    events.sort_by_key(|e| e.time);
    events
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
