/// Station reference data loader - parses stations.toml
///
/// Separates station metadata from code, making it easy to add stations,
/// adjust published series codes, or flag a channel as high-flow without
/// recompiling the service. When the file is absent the built-in registry
/// in `stations.rs` is used instead.

use serde::Deserialize;
use std::fs;

use crate::stations::{Station, StationDirectory};

/// Station metadata as it appears in stations.toml.
#[derive(Debug, Clone, Deserialize)]
pub struct StationConfig {
    pub code: String,
    pub name: String,

    // Geographic location
    pub latitude: f64,
    pub longitude: f64,

    /// Time-series codes this station publishes (e.g. ["wlp", "wlp-hilo"]).
    pub available_series: Vec<String>,

    /// Known high-flow channel; absent means false.
    #[serde(default)]
    pub requires_flow_validation: bool,
}

/// Root configuration structure for TOML parsing.
#[derive(Debug, Deserialize)]
struct StationFile {
    station: Vec<StationConfig>,
}

impl From<StationConfig> for Station {
    fn from(config: StationConfig) -> Self {
        Station {
            code: config.code,
            name: config.name,
            latitude: config.latitude,
            longitude: config.longitude,
            available_series: config.available_series,
            requires_flow_validation: config.requires_flow_validation,
        }
    }
}

/// Loads a `StationDirectory` from a stations.toml file.
///
/// # Errors
/// Returns a message naming the path when the file cannot be read or parsed.
/// Callers decide whether that is fatal or a cue to fall back to the
/// built-in registry.
pub fn load_directory(path: &str) -> Result<StationDirectory, String> {
    let contents =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path, e))?;

    let file: StationFile =
        toml::from_str(&contents).map_err(|e| format!("Failed to parse {}: {}", path, e))?;

    if file.station.is_empty() {
        return Err(format!("{} contains no stations", path));
    }

    Ok(StationDirectory::new(
        file.station.into_iter().map(Station::from).collect(),
    ))
}

/// Loads stations.toml from the working directory, falling back to the
/// built-in registry when the file is missing or malformed.
pub fn load_directory_or_builtin() -> StationDirectory {
    match load_directory("stations.toml") {
        Ok(directory) => directory,
        Err(e) => {
            eprintln!("   {} — using built-in station registry", e);
            StationDirectory::builtin()
        }
    }
}
