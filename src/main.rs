//! Marine Conditions Service - Main Entry Point
//!
//! A service that reconciles hydrographic station data with open-ocean
//! model forecasts for the Salish Sea, classifies marine events (slack,
//! max flood/ebb, high/low tide), and computes safe slack-water windows.
//!
//! Usage:
//!   cargo run --release                          # One-shot query for the default stations
//!   cargo run --release -- --current-station 09079
//!   cargo run --release -- --lat 48.87 --lon -123.31
//!   cargo run --release -- --endpoint 8080       # Serve the HTTP API on port 8080

use marcon_service::conditions::{get_marine_conditions, ConditionsRequest};
use marcon_service::config;
use marcon_service::endpoint;
use marcon_service::model::EventKind;
use marcon_service::reconcile::{CancelToken, Reconciler};
use marcon_service::stations::DEFAULT_CURRENT_STATION;
use std::env;

fn main() {
    println!("🌊 Marine Conditions Service");
    println!("============================\n");

    // Parse command-line arguments
    let args: Vec<String> = env::args().collect();
    let mut endpoint_port: Option<u16> = None;
    let mut latitude: Option<f64> = None;
    let mut longitude: Option<f64> = None;
    let mut tide_station: Option<String> = None;
    let mut current_station: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--endpoint" => {
                if i + 1 < args.len() {
                    endpoint_port = args[i + 1].parse().ok();
                    i += 2;
                } else {
                    eprintln!("Error: --endpoint requires a port number");
                    std::process::exit(1);
                }
            }
            "--lat" => {
                if i + 1 < args.len() {
                    latitude = args[i + 1].parse().ok();
                    i += 2;
                } else {
                    eprintln!("Error: --lat requires a value");
                    std::process::exit(1);
                }
            }
            "--lon" => {
                if i + 1 < args.len() {
                    longitude = args[i + 1].parse().ok();
                    i += 2;
                } else {
                    eprintln!("Error: --lon requires a value");
                    std::process::exit(1);
                }
            }
            "--tide-station" => {
                if i + 1 < args.len() {
                    tide_station = Some(args[i + 1].clone());
                    i += 2;
                } else {
                    eprintln!("Error: --tide-station requires a station code");
                    std::process::exit(1);
                }
            }
            "--current-station" => {
                if i + 1 < args.len() {
                    current_station = Some(args[i + 1].clone());
                    i += 2;
                } else {
                    eprintln!("Error: --current-station requires a station code");
                    std::process::exit(1);
                }
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                eprintln!(
                    "Usage: {} [--endpoint PORT] [--lat LAT --lon LON] \
                     [--tide-station CODE] [--current-station CODE]",
                    args[0]
                );
                std::process::exit(1);
            }
        }
    }

    // Load the station registry (stations.toml, falling back to built-in)
    println!("📊 Loading station registry...");
    let directory = config::load_directory_or_builtin();
    println!("✓ {} stations registered\n", directory.stations().len());

    let reconciler = match Reconciler::new(directory) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("❌ Failed to initialize HTTP client: {}", e);
            std::process::exit(1);
        }
    };

    // Serve the HTTP API if requested; this blocks until killed.
    if let Some(port) = endpoint_port {
        println!("🚀 Starting HTTP endpoint server...");
        if let Err(e) = endpoint::start_endpoint_server(port, reconciler) {
            eprintln!("❌ Endpoint server error: {}", e);
            std::process::exit(1);
        }
        return;
    }

    // One-shot query mode. Coordinates default to the current station's
    // location inside the reconciler; resolve the display name here.
    let station_code = current_station
        .clone()
        .unwrap_or_else(|| DEFAULT_CURRENT_STATION.to_string());
    let station_name = reconciler
        .directory()
        .lookup(&station_code)
        .map(|s| s.name.clone())
        .unwrap_or_else(|| station_code.clone());

    let (lat, lon) = match (latitude, longitude) {
        (Some(lat), Some(lon)) => (lat, lon),
        _ => {
            let station = reconciler
                .directory()
                .lookup_or_default(&station_code, DEFAULT_CURRENT_STATION);
            match station {
                Some(s) => (s.latitude, s.longitude),
                None => {
                    eprintln!("❌ No coordinates given and no station to take them from");
                    std::process::exit(1);
                }
            }
        }
    };

    println!("🔎 Querying conditions near {} ({:.4}, {:.4})...", station_name, lat, lon);

    let request = ConditionsRequest {
        latitude: lat,
        longitude: lon,
        tide_station,
        current_station,
        daylight: None,
    };

    match get_marine_conditions(&reconciler, &request, &CancelToken::new()) {
        Ok(conditions) => {
            for source in &conditions.reconciliation.sources_used {
                match &source.warning {
                    Some(warning) => {
                        println!("   {:?} data: {} ⚠ {}", source.role, source.provider, warning)
                    }
                    None => println!("   {:?} data: {}", source.role, source.provider),
                }
            }

            println!("\n📅 Events (next 48 h):");
            for event in &conditions.events {
                let label = match event.kind {
                    EventKind::Slack => "slack",
                    EventKind::MaxFlood => "max flood",
                    EventKind::MaxEbb => "max ebb",
                    EventKind::HighTide => "high tide",
                    EventKind::LowTide => "low tide",
                };
                println!(
                    "   {} - {:<9} {:.1} kn",
                    event.time.format("%Y-%m-%d %H:%M"),
                    label,
                    event.speed
                );
            }

            println!("\n🤿 Slack windows:");
            if conditions.slack_windows.is_empty() {
                println!("   (none in range)");
            }
            for window in &conditions.slack_windows {
                println!(
                    "   {} → {} ({} min, {} tide)",
                    window.window_start.format("%H:%M"),
                    window.window_end.format("%H:%M"),
                    window.duration_minutes,
                    if window.is_high_tide { "high" } else { "low" }
                );
            }
        }
        Err(e) => {
            eprintln!("❌ Conditions query failed: {}", e);
            std::process::exit(1);
        }
    }
}
