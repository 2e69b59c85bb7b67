/// Top-level conditions query: reconcile, classify, window.
///
/// This is the one entry point callers use. Everything below it is pure
/// given the reconciled data, so the pipeline from a `Reconciliation` to
/// events and windows is exposed separately (`derive_conditions`) and the
/// network step stays confined to `Reconciler`.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::analysis::events::{classify_events, EventSources, LOOKAHEAD_HOURS};
use crate::analysis::windows::{calculate_slack_windows, find_slack_indices};
use crate::model::{MarconError, MarineEvent, ReconciliationResult, SlackWindow};
use crate::reconcile::{CancelToken, ReconcileRequest, Reconciler, Reconciliation};

/// Parameters for one conditions query.
#[derive(Debug, Clone, Default)]
pub struct ConditionsRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub tide_station: Option<String>,
    pub current_station: Option<String>,
    /// Optional (sunrise, sunset) pair; when set, slack windows outside it
    /// are dropped.
    pub daylight: Option<(DateTime<Utc>, DateTime<Utc>)>,
}

/// The full answer to a conditions query.
#[derive(Debug, Clone, Serialize)]
pub struct MarineConditions {
    pub reconciliation: ReconciliationResult,
    pub events: Vec<MarineEvent>,
    pub slack_windows: Vec<SlackWindow>,
}

/// Derives events and slack windows from an already-reconciled picture.
pub fn derive_conditions(
    reconciliation: &Reconciliation,
    now: DateTime<Utc>,
    daylight: Option<(DateTime<Utc>, DateTime<Utc>)>,
) -> (Vec<MarineEvent>, Vec<SlackWindow>) {
    let result = &reconciliation.result;

    let events = classify_events(
        &EventSources {
            times: &result.times,
            current_speeds: &result.current_speeds,
            current_directions: &result.current_directions,
            tide_heights: &result.tide_heights,
            current_extrema: &reconciliation.current_extrema,
            tide_extrema: &reconciliation.tide_extrema,
        },
        now,
    );

    // Window boundaries need the continuous hourly series, so slack
    // indices always come from the speed scan even when the events above
    // came from authoritative extrema records.
    let slack_indices = find_slack_indices(&result.current_speeds);
    let slack_windows = calculate_slack_windows(
        &result.times,
        &result.current_speeds,
        &result.tide_heights,
        &slack_indices,
        daylight,
    );

    (events, slack_windows)
}

/// Fetches, reconciles, and analyzes marine conditions for a location over
/// the next 48 hours.
///
/// # Errors
/// - `MarconError::LatitudeOutOfRange` / `LongitudeOutOfRange`
/// - `MarconError::Cancelled`
pub fn get_marine_conditions(
    reconciler: &Reconciler,
    request: &ConditionsRequest,
    cancel: &CancelToken,
) -> Result<MarineConditions, MarconError> {
    let now = Utc::now();
    let reconciliation = reconciler.reconcile(
        &ReconcileRequest {
            latitude: request.latitude,
            longitude: request.longitude,
            tide_station: request.tide_station.clone(),
            current_station: request.current_station.clone(),
            from: now,
            to: now + Duration::hours(LOOKAHEAD_HOURS),
        },
        cancel,
    )?;

    let (events, slack_windows) = derive_conditions(&reconciliation, now, request.daylight);

    Ok(MarineConditions {
        reconciliation: reconciliation.result,
        events,
        slack_windows,
    })
}
