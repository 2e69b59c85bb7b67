/// Source reconciliation.
///
/// Fetches the authoritative station series and the open-ocean model
/// forecast concurrently, then joins them into one hourly picture. The
/// policy, per slice:
///
///   tide heights    — station predictions when present, else the model's
///                     sea level series
///   current speeds  — station predictions when present AND plausible,
///                     else the model (flagged `is_modeled` + warning)
///   directions, waves, sea surface temperature — always from the model
///
/// "Plausible" matters for the handful of narrow channels marked
/// `requires_flow_validation`: those run well over 2 kn on any real day,
/// so a station series that never reaches 2 kn is almost certainly the
/// wrong dataset for the channel and is discarded in favor of the model.
///
/// Source failures are absorbed here. A fetch error never fails the
/// request; it just shifts that slice to its fallback. Only coordinate
/// validation and cancellation surface as errors.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Timelike, Utc};
use threadpool::ThreadPool;

use crate::analysis::hourly::map_to_hourly;
use crate::ingest::iwls;
use crate::ingest::marine_model::{self, ModelForecast};
use crate::model::{
    MarconError, RawSample, ReconciliationResult, SourceDescriptor, SourceRole,
    MODELED_DATA_WARNING,
};
use crate::stations::{
    Station, StationDirectory, DEFAULT_CURRENT_STATION, DEFAULT_EXTREMA_SERIES,
    DEFAULT_SPEED_SERIES, DEFAULT_TIDE_STATION, EXTREMA_SERIES_PRIORITY, SERIES_TIDE_HILO,
    SERIES_TIDE_PREDICTIONS, SPEED_SERIES_PRIORITY,
};

/// Flow-validated stations must show at least this predicted maximum (kn)
/// for their current series to be trusted.
pub const PLAUSIBLE_MAX_CURRENT_KN: f64 = 2.0;

/// Per-request HTTP timeout. A hung source must not stall the whole join.
const HTTP_TIMEOUT_SECS: u64 = 10;

/// One worker per source; all five fetches run at once.
const FETCH_WORKERS: usize = 5;

/// How often the join re-checks the cancel token while waiting on workers.
const JOIN_POLL_MS: u64 = 25;

const PROVIDER_STATION: &str = "station-network";
const PROVIDER_MODEL: &str = "marine-model";

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

/// Cooperative cancellation handle. Clone it, hand one to the caller, and
/// in-flight work is abandoned at the next checkpoint after `cancel()`.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// ---------------------------------------------------------------------------
// Fan-out plumbing
// ---------------------------------------------------------------------------

/// Identifies which fetch a `SourceOutcome` came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceTag {
    Model,
    TideLevels,
    TideExtrema,
    CurrentSpeeds,
    CurrentExtrema,
}

enum FetchResult {
    Model(ModelForecast),
    Samples(Vec<RawSample>),
}

/// Tagged result of one fetch, sent back over the join channel.
struct SourceOutcome {
    tag: SourceTag,
    outcome: Result<FetchResult, MarconError>,
}

// ---------------------------------------------------------------------------
// Request / response
// ---------------------------------------------------------------------------

/// Parameters for one reconciliation.
#[derive(Debug, Clone)]
pub struct ReconcileRequest {
    pub latitude: f64,
    pub longitude: f64,
    /// Station codes; unknown or absent codes resolve to the defaults.
    pub tide_station: Option<String>,
    pub current_station: Option<String>,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

/// A reconciled picture plus the raw extrema records the event classifier
/// consumes directly (they are event records, not hourly series, so they
/// bypass the grid).
#[derive(Debug, Clone)]
pub struct Reconciliation {
    pub result: ReconciliationResult,
    pub tide_extrema: Vec<RawSample>,
    pub current_extrema: Vec<RawSample>,
}

// ---------------------------------------------------------------------------
// Reconciler
// ---------------------------------------------------------------------------

pub struct Reconciler {
    directory: StationDirectory,
    client: reqwest::blocking::Client,
    pool: ThreadPool,
}

impl Reconciler {
    /// # Errors
    /// - `MarconError::Http` — the HTTP client could not be constructed.
    pub fn new(directory: StationDirectory) -> Result<Self, MarconError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(StdDuration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .map_err(|e| MarconError::Http(e.to_string()))?;

        Ok(Self {
            directory,
            client,
            pool: ThreadPool::new(FETCH_WORKERS),
        })
    }

    pub fn directory(&self) -> &StationDirectory {
        &self.directory
    }

    /// Fetches all sources concurrently and joins them into one hourly
    /// picture for the requested location and time range.
    ///
    /// # Errors
    /// - `MarconError::LatitudeOutOfRange` / `LongitudeOutOfRange`
    /// - `MarconError::Cancelled` — `cancel` was triggered mid-flight.
    pub fn reconcile(
        &self,
        request: &ReconcileRequest,
        cancel: &CancelToken,
    ) -> Result<Reconciliation, MarconError> {
        validate_coordinates(request.latitude, request.longitude)?;

        let tide_station = self
            .directory
            .lookup_or_default(
                request.tide_station.as_deref().unwrap_or(DEFAULT_TIDE_STATION),
                DEFAULT_TIDE_STATION,
            )
            .cloned();
        let current_station = self
            .directory
            .lookup_or_default(
                request
                    .current_station
                    .as_deref()
                    .unwrap_or(DEFAULT_CURRENT_STATION),
                DEFAULT_CURRENT_STATION,
            )
            .cloned();

        let outcomes = self.fan_out(request, tide_station.as_ref(), current_station.as_ref(), cancel);

        if cancel.is_cancelled() {
            return Err(MarconError::Cancelled);
        }

        Ok(assemble(
            outcomes,
            tide_station.as_ref(),
            current_station.as_ref(),
            request.from,
            request.to,
        ))
    }

    /// Dispatches every fetch onto the worker pool and collects the tagged
    /// outcomes. Always returns one outcome per dispatched job.
    fn fan_out(
        &self,
        request: &ReconcileRequest,
        tide_station: Option<&Station>,
        current_station: Option<&Station>,
        cancel: &CancelToken,
    ) -> Vec<SourceOutcome> {
        let (tx, rx) = mpsc::channel::<SourceOutcome>();
        let mut dispatched = 0;

        let forecast_days = forecast_days_for_range(request.from, request.to);

        // Model forecast for the raw coordinates.
        {
            let tx = tx.clone();
            let client = self.client.clone();
            let cancel = cancel.clone();
            let (lat, lon) = (request.latitude, request.longitude);
            dispatched += 1;
            self.pool.execute(move || {
                let outcome = if cancel.is_cancelled() {
                    Err(MarconError::Cancelled)
                } else {
                    marine_model::fetch_forecast(&client, lat, lon, forecast_days)
                        .map(FetchResult::Model)
                };
                let _ = tx.send(SourceOutcome {
                    tag: SourceTag::Model,
                    outcome,
                });
            });
        }

        // Station series: two for the tide station, two for the current
        // station. A missing station just means those jobs never run.
        let mut station_jobs: Vec<(SourceTag, String, String)> = Vec::new();
        if let Some(station) = tide_station {
            station_jobs.push((
                SourceTag::TideLevels,
                station.code.clone(),
                SERIES_TIDE_PREDICTIONS.to_string(),
            ));
            station_jobs.push((
                SourceTag::TideExtrema,
                station.code.clone(),
                SERIES_TIDE_HILO.to_string(),
            ));
        }
        if let Some(station) = current_station {
            station_jobs.push((
                SourceTag::CurrentSpeeds,
                station.code.clone(),
                station
                    .select_series(SPEED_SERIES_PRIORITY, DEFAULT_SPEED_SERIES)
                    .to_string(),
            ));
            station_jobs.push((
                SourceTag::CurrentExtrema,
                station.code.clone(),
                station
                    .select_series(EXTREMA_SERIES_PRIORITY, DEFAULT_EXTREMA_SERIES)
                    .to_string(),
            ));
        }

        for (tag, station_code, series_code) in station_jobs {
            let tx = tx.clone();
            let client = self.client.clone();
            let cancel = cancel.clone();
            let (from, to) = (request.from, request.to);
            dispatched += 1;
            self.pool.execute(move || {
                let outcome = if cancel.is_cancelled() {
                    Err(MarconError::Cancelled)
                } else {
                    iwls::fetch_series(&client, &station_code, &series_code, from, to)
                        .map(FetchResult::Samples)
                };
                let _ = tx.send(SourceOutcome { tag, outcome });
            });
        }

        drop(tx);
        collect_outcomes(&rx, dispatched, cancel)
    }
}

/// Joins the fan-out: waits for `expected` outcomes, polling the cancel
/// token between receives. On cancellation the join stops waiting —
/// whatever already arrived is kept and outstanding sources are treated
/// as absent, so a worker stuck in a slow HTTP call cannot stall the
/// caller past the next poll tick.
fn collect_outcomes(
    rx: &mpsc::Receiver<SourceOutcome>,
    expected: usize,
    cancel: &CancelToken,
) -> Vec<SourceOutcome> {
    let mut outcomes = Vec::with_capacity(expected);

    while outcomes.len() < expected {
        // Drain anything already delivered before deciding to give up.
        while let Ok(outcome) = rx.try_recv() {
            outcomes.push(outcome);
        }
        if outcomes.len() >= expected || cancel.is_cancelled() {
            break;
        }
        match rx.recv_timeout(StdDuration::from_millis(JOIN_POLL_MS)) {
            Ok(outcome) => outcomes.push(outcome),
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }

    outcomes
}

fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), MarconError> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(MarconError::LatitudeOutOfRange(latitude));
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(MarconError::LongitudeOutOfRange(longitude));
    }
    Ok(())
}

fn forecast_days_for_range(from: DateTime<Utc>, to: DateTime<Utc>) -> u8 {
    let days = ((to - from).num_hours() as f64 / 24.0).ceil() as i64;
    days.clamp(1, 7) as u8
}

/// Fallback hourly axis for when the model is down: one timestamp per
/// hour over [from, to], truncated to the hour.
fn synthesize_hourly_axis(from: DateTime<Utc>, to: DateTime<Utc>) -> Vec<DateTime<Utc>> {
    let mut times = Vec::new();
    let mut t = from
        .date_naive()
        .and_hms_opt(from.hour(), 0, 0)
        .map(|n| n.and_utc())
        .unwrap_or(from);
    while t <= to {
        times.push(t);
        t += Duration::hours(1);
    }
    times
}

// ---------------------------------------------------------------------------
// The join
// ---------------------------------------------------------------------------

/// Pure join of the fetch outcomes into one reconciled picture. All the
/// fallback policy lives here, away from any networking, so it can be
/// exercised with constructed outcomes.
fn assemble(
    outcomes: Vec<SourceOutcome>,
    tide_station: Option<&Station>,
    current_station: Option<&Station>,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Reconciliation {
    let mut model: Option<ModelForecast> = None;
    let mut tide_levels: Vec<RawSample> = Vec::new();
    let mut tide_extrema: Vec<RawSample> = Vec::new();
    let mut current_speeds_raw: Vec<RawSample> = Vec::new();
    let mut current_extrema: Vec<RawSample> = Vec::new();

    for SourceOutcome { tag, outcome } in outcomes {
        match outcome {
            Ok(FetchResult::Model(forecast)) => model = Some(forecast),
            Ok(FetchResult::Samples(samples)) => match tag {
                SourceTag::TideLevels => tide_levels = samples,
                SourceTag::TideExtrema => tide_extrema = samples,
                SourceTag::CurrentSpeeds => current_speeds_raw = samples,
                SourceTag::CurrentExtrema => current_extrema = samples,
                SourceTag::Model => {}
            },
            Err(e) => {
                eprintln!("Warning: source {:?} unavailable: {}", tag, e);
            }
        }
    }

    let times: Vec<DateTime<Utc>> = match &model {
        Some(forecast) if !forecast.times.is_empty() => forecast.times.clone(),
        _ => synthesize_hourly_axis(from, to),
    };
    let n = times.len();

    let zeroes = || vec![0.0; n];
    let mut sources_used = Vec::new();

    // Tide heights: station predictions, else model sea level.
    let tide_heights = if !tide_levels.is_empty() {
        sources_used.push(SourceDescriptor {
            role: SourceRole::Tide,
            provider: format!(
                "{} ({})",
                PROVIDER_STATION,
                tide_station.map(|s| s.code.as_str()).unwrap_or("?")
            ),
            warning: None,
        });
        map_to_hourly(&times, &tide_levels)
    } else {
        sources_used.push(SourceDescriptor {
            role: SourceRole::Tide,
            provider: PROVIDER_MODEL.to_string(),
            warning: None,
        });
        model.as_ref().map(|f| f.sea_levels.clone()).unwrap_or_else(zeroes)
    };

    // Current speeds: station predictions when present and plausible.
    // Speeds are stored as magnitudes; the published sign only encodes
    // flood/ebb, which the extrema records carry anyway.
    let mapped_speeds: Vec<f64> = map_to_hourly(&times, &current_speeds_raw)
        .into_iter()
        .map(f64::abs)
        .collect();
    let station_max = mapped_speeds.iter().cloned().fold(0.0, f64::max);

    let needs_validation = current_station.map(|s| s.requires_flow_validation).unwrap_or(false);
    let implausible = needs_validation && station_max < PLAUSIBLE_MAX_CURRENT_KN;
    let have_station_currents = !current_speeds_raw.is_empty();

    let (current_speeds, is_modeled) = if have_station_currents && !implausible {
        sources_used.push(SourceDescriptor {
            role: SourceRole::Current,
            provider: format!(
                "{} ({})",
                PROVIDER_STATION,
                current_station.map(|s| s.code.as_str()).unwrap_or("?")
            ),
            warning: None,
        });
        (mapped_speeds, false)
    } else {
        if implausible {
            eprintln!(
                "Warning: station {} max predicted current {:.1} kn fails plausibility \
                 (< {:.1} kn for a flow-validated channel); using model data",
                current_station.map(|s| s.code.as_str()).unwrap_or("?"),
                station_max,
                PLAUSIBLE_MAX_CURRENT_KN
            );
        }
        sources_used.push(SourceDescriptor {
            role: SourceRole::Current,
            provider: PROVIDER_MODEL.to_string(),
            warning: Some(MODELED_DATA_WARNING.to_string()),
        });
        let speeds = model
            .as_ref()
            .map(|f| f.current_speeds.clone())
            .unwrap_or_else(zeroes);
        (speeds, true)
    };

    // A station whose speed series failed plausibility is the wrong
    // dataset for the channel; its extrema are equally suspect.
    if implausible {
        current_extrema.clear();
    }

    let current_directions = model
        .as_ref()
        .map(|f| f.current_directions.clone())
        .unwrap_or_else(zeroes);
    let wave_heights = model
        .as_ref()
        .map(|f| f.wave_heights.clone())
        .unwrap_or_else(zeroes);
    let sea_surface_temps = model
        .as_ref()
        .map(|f| f.sea_surface_temps.clone())
        .unwrap_or_else(zeroes);

    sources_used.push(SourceDescriptor {
        role: SourceRole::Waves,
        provider: PROVIDER_MODEL.to_string(),
        warning: None,
    });

    Reconciliation {
        result: ReconciliationResult {
            times,
            tide_heights,
            current_speeds,
            current_directions,
            wave_heights,
            sea_surface_temps,
            is_modeled,
            sources_used,
        },
        tide_extrema,
        current_extrema,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn hour(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 29, h, 0, 0).unwrap()
    }

    fn sample(h: u32, m: u32, value: f64) -> RawSample {
        RawSample {
            timestamp: Utc.with_ymd_and_hms(2026, 8, 29, h, m, 0).unwrap(),
            value,
            qualifier: None,
        }
    }

    fn model_forecast(n: usize) -> ModelForecast {
        ModelForecast {
            times: (0..n as u32).map(hour).collect(),
            current_speeds: vec![3.1; n],
            current_directions: vec![95.0; n],
            wave_heights: vec![0.4; n],
            sea_surface_temps: vec![14.0; n],
            sea_levels: vec![1.1; n],
        }
    }

    fn ok(tag: SourceTag, result: FetchResult) -> SourceOutcome {
        SourceOutcome {
            tag,
            outcome: Ok(result),
        }
    }

    fn failed(tag: SourceTag) -> SourceOutcome {
        SourceOutcome {
            tag,
            outcome: Err(MarconError::Http("connection refused".to_string())),
        }
    }

    fn flow_validated_station() -> Station {
        StationDirectory::builtin().lookup("09084").unwrap().clone()
    }

    fn unvalidated_station() -> Station {
        StationDirectory::builtin().lookup("09079").unwrap().clone()
    }

    fn tide_station() -> Station {
        StationDirectory::builtin().lookup("07795").unwrap().clone()
    }

    // --- Coordinate validation ----------------------------------------------

    #[test]
    fn test_out_of_range_coordinates_rejected_before_any_fetch() {
        assert!(matches!(
            validate_coordinates(90.1, 0.0),
            Err(MarconError::LatitudeOutOfRange(_))
        ));
        assert!(matches!(
            validate_coordinates(0.0, -180.5),
            Err(MarconError::LongitudeOutOfRange(_))
        ));
        assert!(validate_coordinates(-90.0, 180.0).is_ok(), "bounds are inclusive");
    }

    // --- Fallback policy -----------------------------------------------------

    #[test]
    fn test_authoritative_currents_used_when_plausible() {
        let outcomes = vec![
            ok(SourceTag::Model, FetchResult::Model(model_forecast(6))),
            ok(
                SourceTag::CurrentSpeeds,
                FetchResult::Samples(vec![
                    sample(0, 0, 0.5),
                    sample(1, 0, 2.8),
                    sample(2, 0, -4.5),
                ]),
            ),
        ];
        let r = assemble(
            outcomes,
            Some(&tide_station()),
            Some(&flow_validated_station()),
            hour(0),
            hour(5),
        );
        assert!(!r.result.is_modeled);
        // Mapped as magnitudes: the -4.5 ebb reads as 4.5 kn.
        assert!((r.result.current_speeds[2] - 4.5).abs() < 1e-9);
        let current = r
            .result
            .sources_used
            .iter()
            .find(|s| s.role == SourceRole::Current)
            .unwrap();
        assert!(current.provider.contains("09084"));
        assert!(current.warning.is_none());
    }

    #[test]
    fn test_implausibly_low_currents_at_validated_station_fall_to_model() {
        // Active Pass predicting a 1.5 kn max is not credible.
        let outcomes = vec![
            ok(SourceTag::Model, FetchResult::Model(model_forecast(6))),
            ok(
                SourceTag::CurrentSpeeds,
                FetchResult::Samples(vec![sample(0, 0, 0.8), sample(1, 0, 1.5)]),
            ),
            ok(
                SourceTag::CurrentExtrema,
                FetchResult::Samples(vec![sample(2, 0, 1.4)]),
            ),
        ];
        let r = assemble(
            outcomes,
            Some(&tide_station()),
            Some(&flow_validated_station()),
            hour(0),
            hour(5),
        );
        assert!(r.result.is_modeled);
        assert_eq!(r.result.current_speeds, vec![3.1; 6], "model speeds verbatim");
        assert!(
            r.current_extrema.is_empty(),
            "extrema from an implausible station are discarded with it"
        );
        let current = r
            .result
            .sources_used
            .iter()
            .find(|s| s.role == SourceRole::Current)
            .unwrap();
        assert_eq!(current.warning.as_deref(), Some(MODELED_DATA_WARNING));
    }

    #[test]
    fn test_low_currents_without_validation_flag_are_trusted() {
        // Porlier Pass is not flow-validated; 1.5 kn max passes through.
        let outcomes = vec![
            ok(SourceTag::Model, FetchResult::Model(model_forecast(6))),
            ok(
                SourceTag::CurrentSpeeds,
                FetchResult::Samples(vec![sample(0, 0, 0.8), sample(1, 0, 1.5)]),
            ),
        ];
        let r = assemble(
            outcomes,
            Some(&tide_station()),
            Some(&unvalidated_station()),
            hour(0),
            hour(5),
        );
        assert!(!r.result.is_modeled);
        assert!((r.result.current_speeds[1] - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_failed_current_fetch_falls_to_model_series_verbatim() {
        let outcomes = vec![
            ok(SourceTag::Model, FetchResult::Model(model_forecast(4))),
            failed(SourceTag::CurrentSpeeds),
            failed(SourceTag::CurrentExtrema),
        ];
        let r = assemble(
            outcomes,
            Some(&tide_station()),
            Some(&unvalidated_station()),
            hour(0),
            hour(3),
        );
        assert!(r.result.is_modeled);
        assert_eq!(r.result.current_speeds, vec![3.1; 4]);
        assert_eq!(r.result.current_directions, vec![95.0; 4]);
    }

    #[test]
    fn test_tide_falls_back_to_model_sea_level() {
        let outcomes = vec![
            ok(SourceTag::Model, FetchResult::Model(model_forecast(4))),
            failed(SourceTag::TideLevels),
        ];
        let r = assemble(
            outcomes,
            Some(&tide_station()),
            Some(&unvalidated_station()),
            hour(0),
            hour(3),
        );
        assert_eq!(r.result.tide_heights, vec![1.1; 4]);
        // Modeled tide alone does not set the currents flag.
        let tide = r
            .result
            .sources_used
            .iter()
            .find(|s| s.role == SourceRole::Tide)
            .unwrap();
        assert_eq!(tide.provider, PROVIDER_MODEL);
    }

    #[test]
    fn test_station_tide_mapped_onto_model_axis() {
        let outcomes = vec![
            ok(SourceTag::Model, FetchResult::Model(model_forecast(3))),
            ok(
                SourceTag::TideLevels,
                // 10 minutes off the hour: nearest-neighbor still maps it.
                FetchResult::Samples(vec![sample(0, 10, 2.9), sample(1, 10, 3.2)]),
            ),
        ];
        let r = assemble(
            outcomes,
            Some(&tide_station()),
            Some(&unvalidated_station()),
            hour(0),
            hour(2),
        );
        assert!((r.result.tide_heights[0] - 2.9).abs() < 1e-9);
        assert!((r.result.tide_heights[1] - 3.2).abs() < 1e-9);
        assert_eq!(r.result.tide_heights[2], 0.0, "no sample near 02:00");
    }

    #[test]
    fn test_total_failure_synthesizes_axis_and_zero_fills() {
        let outcomes = vec![
            failed(SourceTag::Model),
            failed(SourceTag::TideLevels),
            failed(SourceTag::CurrentSpeeds),
        ];
        let r = assemble(
            outcomes,
            Some(&tide_station()),
            Some(&unvalidated_station()),
            hour(0),
            hour(5),
        );
        assert_eq!(r.result.times.len(), 6, "hourly axis over [from, to]");
        assert_eq!(r.result.times[0], hour(0));
        assert_eq!(r.result.times[5], hour(5));
        assert!(r.result.is_modeled);
        assert!(r.result.current_speeds.iter().all(|&v| v == 0.0));
        assert!(r.result.tide_heights.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_all_result_arrays_share_the_axis_length() {
        let outcomes = vec![ok(SourceTag::Model, FetchResult::Model(model_forecast(7)))];
        let r = assemble(
            outcomes,
            Some(&tide_station()),
            Some(&unvalidated_station()),
            hour(0),
            hour(6),
        );
        let n = r.result.times.len();
        assert_eq!(r.result.tide_heights.len(), n);
        assert_eq!(r.result.current_speeds.len(), n);
        assert_eq!(r.result.current_directions.len(), n);
        assert_eq!(r.result.wave_heights.len(), n);
        assert_eq!(r.result.sea_surface_temps.len(), n);
    }

    #[test]
    fn test_extrema_records_pass_through_untouched() {
        let mut extrema = vec![sample(4, 55, 4.8)];
        extrema[0].qualifier = Some("EXTREMA_FLOOD".to_string());
        let outcomes = vec![
            ok(SourceTag::Model, FetchResult::Model(model_forecast(6))),
            ok(SourceTag::CurrentExtrema, FetchResult::Samples(extrema.clone())),
            ok(SourceTag::TideExtrema, FetchResult::Samples(vec![sample(2, 30, 4.4)])),
        ];
        let r = assemble(
            outcomes,
            Some(&tide_station()),
            Some(&unvalidated_station()),
            hour(0),
            hour(5),
        );
        assert_eq!(r.current_extrema, extrema);
        assert_eq!(r.tide_extrema.len(), 1);
    }

    // --- Misc helpers --------------------------------------------------------

    #[test]
    fn test_forecast_days_covers_the_range() {
        assert_eq!(forecast_days_for_range(hour(0), hour(5)), 1);
        let two_days = hour(0) + Duration::hours(47);
        assert_eq!(forecast_days_for_range(hour(0), two_days), 2);
        let long = hour(0) + Duration::days(30);
        assert_eq!(forecast_days_for_range(hour(0), long), 7, "clamped to a week");
    }

    #[test]
    fn test_cancelled_join_keeps_delivered_outcomes_and_stops_waiting() {
        let (tx, rx) = mpsc::channel();
        tx.send(ok(SourceTag::Model, FetchResult::Model(model_forecast(3))))
            .unwrap();
        tx.send(failed(SourceTag::TideLevels)).unwrap();

        let cancel = CancelToken::new();
        cancel.cancel();

        // The sender stays alive but never produces the remaining three
        // outcomes, standing in for workers stuck in slow HTTP calls.
        let started = std::time::Instant::now();
        let outcomes = collect_outcomes(&rx, 5, &cancel);
        drop(tx);

        assert_eq!(outcomes.len(), 2, "already-delivered outcomes are kept");
        assert!(
            started.elapsed() < StdDuration::from_secs(2),
            "a cancelled join must not wait out stragglers"
        );
    }

    #[test]
    fn test_cancel_mid_wait_unblocks_the_join() {
        let (tx, rx) = mpsc::channel::<SourceOutcome>();

        let cancel = CancelToken::new();
        let trigger = cancel.clone();
        std::thread::spawn(move || {
            std::thread::sleep(StdDuration::from_millis(50));
            trigger.cancel();
        });

        let started = std::time::Instant::now();
        let outcomes = collect_outcomes(&rx, 1, &cancel);
        drop(tx);

        assert!(outcomes.is_empty());
        assert!(
            started.elapsed() < StdDuration::from_secs(2),
            "cancellation must release a join blocked on an empty channel"
        );
    }

    #[test]
    fn test_cancel_token_is_sticky() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled(), "cancellation is visible through clones");
    }

    #[test]
    fn test_reconcile_rejects_bad_coordinates_without_fetching() {
        let reconciler = Reconciler::new(StationDirectory::builtin()).expect("client builds");
        let request = ReconcileRequest {
            latitude: 95.0,
            longitude: -123.0,
            tide_station: None,
            current_station: None,
            from: hour(0),
            to: hour(5),
        };
        assert!(matches!(
            reconciler.reconcile(&request, &CancelToken::new()),
            Err(MarconError::LatitudeOutOfRange(_))
        ));
    }
}
