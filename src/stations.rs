/// Marine station registry for the Salish Sea / BC south coast.
///
/// Defines the canonical list of hydrographic stations this service knows
/// about: tide (water level) stations and tidal-current stations, with the
/// time-series codes each one publishes. This is the single source of truth
/// for station codes — other modules should resolve stations through a
/// `StationDirectory` rather than hardcoding codes.
///
/// Sources:
///   - Station codes and series codes: CHS Integrated Water Level System
///     (api.iwls-sine.azure.cloud-nuage.canada.ca)
///   - Coordinates: CHS station metadata

// ---------------------------------------------------------------------------
// Series codes
// ---------------------------------------------------------------------------

/// Water level predictions (hourly).
pub const SERIES_TIDE_PREDICTIONS: &str = "wlp";
/// Water level hi-lo extrema (event records, not hourly).
pub const SERIES_TIDE_HILO: &str = "wlp-hilo";

/// Current-speed series codes in priority order; the first one a station
/// publishes wins.
pub const SPEED_SERIES_PRIORITY: &[&str] = &["wcsp", "wcs"];
/// Current-extrema series codes in priority order.
pub const EXTREMA_SERIES_PRIORITY: &[&str] = &["wcsp-extrema", "wcsp-slack"];

/// Generic defaults used when a station publishes none of the known series.
pub const DEFAULT_SPEED_SERIES: &str = "wcsp";
pub const DEFAULT_EXTREMA_SERIES: &str = "wcsp-extrema";

/// Substituted when a requested station code is not in the directory.
pub const DEFAULT_TIDE_STATION: &str = "07795"; // Point Atkinson
pub const DEFAULT_CURRENT_STATION: &str = "09084"; // Active Pass

// ---------------------------------------------------------------------------
// Station metadata
// ---------------------------------------------------------------------------

/// Metadata for a single hydrographic station. Immutable reference data,
/// loaded once and never mutated.
#[derive(Debug, Clone)]
pub struct Station {
    /// 5-digit CHS station code.
    pub code: String,
    /// Official station name.
    pub name: String,
    /// WGS84 latitude.
    pub latitude: f64,
    /// WGS84 longitude.
    pub longitude: f64,
    /// Time-series codes this station publishes.
    pub available_series: Vec<String>,
    /// True for known high-flow channels where an implausibly low predicted
    /// current (max < 2.0 kn) means the station data is suspect and the
    /// open-ocean model should be used instead. Set explicitly in reference
    /// data, never inferred from the station name.
    pub requires_flow_validation: bool,
}

impl Station {
    /// Picks the first series code from `priority` that this station
    /// publishes, else `default`.
    pub fn select_series<'a>(&self, priority: &[&'a str], default: &'a str) -> &'a str {
        priority
            .iter()
            .find(|code| self.available_series.iter().any(|s| s == **code))
            .copied()
            .unwrap_or(default)
    }
}

// ---------------------------------------------------------------------------
// Directory
// ---------------------------------------------------------------------------

/// Immutable station registry, constructed once (built-in table or
/// stations.toml via `config::load_directory`) and passed into the
/// reconciler by reference.
#[derive(Debug, Clone)]
pub struct StationDirectory {
    stations: Vec<Station>,
}

impl StationDirectory {
    pub fn new(stations: Vec<Station>) -> Self {
        Self { stations }
    }

    /// Looks up a station by code. Returns `None` if not found; callers
    /// that need a station regardless substitute the documented defaults.
    pub fn lookup(&self, code: &str) -> Option<&Station> {
        self.stations.iter().find(|s| s.code == code)
    }

    /// Looks up `code`, substituting the station at `fallback_code` when the
    /// requested code is unknown. Returns `None` only if the fallback itself
    /// is missing from the registry.
    pub fn lookup_or_default<'a>(&'a self, code: &str, fallback_code: &str) -> Option<&'a Station> {
        self.lookup(code).or_else(|| self.lookup(fallback_code))
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// The built-in registry, used when no stations.toml is present.
    pub fn builtin() -> Self {
        fn station(
            code: &str,
            name: &str,
            latitude: f64,
            longitude: f64,
            series: &[&str],
            requires_flow_validation: bool,
        ) -> Station {
            Station {
                code: code.to_string(),
                name: name.to_string(),
                latitude,
                longitude,
                available_series: series.iter().map(|s| s.to_string()).collect(),
                requires_flow_validation,
            }
        }

        Self::new(vec![
            // --- Water level stations -----------------------------------
            station(
                "07795",
                "Point Atkinson",
                49.3370,
                -123.2530,
                &["wlo", "wlp", "wlp-hilo"],
                false,
            ),
            station(
                "07735",
                "Vancouver",
                49.2863,
                -123.1103,
                &["wlo", "wlp", "wlp-hilo"],
                false,
            ),
            station(
                "07120",
                "Victoria Harbour",
                48.4248,
                -123.3707,
                &["wlo", "wlp", "wlp-hilo"],
                false,
            ),
            station(
                "07330",
                "Fulford Harbour",
                48.7683,
                -123.4500,
                &["wlp", "wlp-hilo"],
                false,
            ),
            // --- Current stations ---------------------------------------
            station(
                "09084",
                "Active Pass",
                48.8733,
                -123.3117,
                &["wcsp", "wcsp-extrema", "wcsp-slack"],
                true,
            ),
            station(
                "08985",
                "Race Passage",
                48.3033,
                -123.5317,
                &["wcsp", "wcsp-extrema"],
                true,
            ),
            station(
                "09079",
                "Porlier Pass",
                49.0117,
                -123.5867,
                &["wcsp", "wcsp-extrema"],
                false,
            ),
            station(
                "09083",
                "Gabriola Passage",
                49.1283,
                -123.7017,
                &["wcs", "wcsp-slack"],
                false,
            ),
        ])
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_station_codes_are_valid_chs_format() {
        // CHS station codes are 5-digit numeric strings. A malformed code
        // would 404 against the IWLS API.
        for station in StationDirectory::builtin().stations() {
            assert_eq!(
                station.code.len(),
                5,
                "code for '{}' should be 5 digits, got '{}'",
                station.name,
                station.code
            );
            assert!(
                station.code.chars().all(|c| c.is_ascii_digit()),
                "code for '{}' should be numeric, got '{}'",
                station.name,
                station.code
            );
        }
    }

    #[test]
    fn test_no_duplicate_station_codes() {
        let mut seen = std::collections::HashSet::new();
        for station in StationDirectory::builtin().stations() {
            assert!(
                seen.insert(station.code.clone()),
                "duplicate station code '{}' in built-in registry",
                station.code
            );
        }
    }

    #[test]
    fn test_default_stations_exist_in_builtin_registry() {
        let directory = StationDirectory::builtin();
        assert!(
            directory.lookup(DEFAULT_TIDE_STATION).is_some(),
            "default tide station must be registered"
        );
        assert!(
            directory.lookup(DEFAULT_CURRENT_STATION).is_some(),
            "default current station must be registered"
        );
    }

    #[test]
    fn test_lookup_returns_none_for_unknown_code() {
        assert!(StationDirectory::builtin().lookup("00000").is_none());
    }

    #[test]
    fn test_lookup_or_default_substitutes_fallback() {
        let directory = StationDirectory::builtin();
        let station = directory
            .lookup_or_default("00000", DEFAULT_TIDE_STATION)
            .expect("fallback should resolve");
        assert_eq!(station.code, DEFAULT_TIDE_STATION);
    }

    #[test]
    fn test_flow_validation_flag_matches_known_high_flow_channels() {
        // Exactly Active Pass and Race Passage carry the flag; the set is a
        // configuration decision, not something inferred from names.
        let directory = StationDirectory::builtin();
        let flagged: Vec<_> = directory
            .stations()
            .iter()
            .filter(|s| s.requires_flow_validation)
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(flagged, vec!["Active Pass", "Race Passage"]);
    }

    #[test]
    fn test_select_series_honors_priority_order() {
        let directory = StationDirectory::builtin();
        let active_pass = directory.lookup("09084").unwrap();
        assert_eq!(
            active_pass.select_series(SPEED_SERIES_PRIORITY, DEFAULT_SPEED_SERIES),
            "wcsp"
        );
        assert_eq!(
            active_pass.select_series(EXTREMA_SERIES_PRIORITY, DEFAULT_EXTREMA_SERIES),
            "wcsp-extrema"
        );

        // Gabriola publishes the legacy speed code and only the slack
        // extrema series.
        let gabriola = directory.lookup("09083").unwrap();
        assert_eq!(
            gabriola.select_series(SPEED_SERIES_PRIORITY, DEFAULT_SPEED_SERIES),
            "wcs"
        );
        assert_eq!(
            gabriola.select_series(EXTREMA_SERIES_PRIORITY, DEFAULT_EXTREMA_SERIES),
            "wcsp-slack"
        );
    }

    #[test]
    fn test_select_series_falls_back_to_generic_default() {
        let bare = Station {
            code: "00001".to_string(),
            name: "No Series".to_string(),
            latitude: 49.0,
            longitude: -123.0,
            available_series: vec![],
            requires_flow_validation: false,
        };
        assert_eq!(
            bare.select_series(SPEED_SERIES_PRIORITY, DEFAULT_SPEED_SERIES),
            DEFAULT_SPEED_SERIES
        );
    }
}
