/// marcon_service: Salish Sea marine conditions service.
///
/// # Module structure
///
/// ```text
/// marcon_service
/// ├── model       — shared data types (RawSample, MarineEvent, SlackWindow, MarconError, …)
/// ├── config      — station registry configuration loader (stations.toml)
/// ├── stations    — CHS station code registry with published series codes
/// ├── reconcile   — concurrent source fetch + join into one hourly picture
/// ├── conditions  — top-level query: reconcile, classify events, compute windows
/// ├── endpoint    — HTTP API for conditions queries
/// ├── ingest
/// │   ├── iwls         — CHS IWLS station API: URL construction + JSON parsing
/// │   ├── marine_model — open-ocean model forecast API client
/// │   └── fixtures (test only) — representative API response payloads
/// └── analysis
///     ├── hourly  — hourly grid alignment + sub-sample extremum interpolation
///     ├── events  — slack / max flood / max ebb / high / low tide classification
///     └── windows — slack-water activity window calculation
/// ```

/// Public modules
pub mod analysis;
pub mod conditions;
pub mod config;
pub mod endpoint;
pub mod ingest;
pub mod model;
pub mod reconcile;
pub mod stations;
