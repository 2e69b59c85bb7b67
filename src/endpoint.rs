/// HTTP endpoint for querying marine conditions
///
/// Provides a simple REST API for external tools (including the web
/// frontend) to query reconciled conditions, events, and slack windows.
///
/// Endpoints:
/// - GET /conditions?lat=..&lon=..[&tide_station=..][&current_station=..]
/// - GET /stations - List the station registry
/// - GET /health - Service health check

use std::collections::HashMap;

use crate::conditions::{get_marine_conditions, ConditionsRequest};
use crate::model::MarconError;
use crate::reconcile::{CancelToken, Reconciler};
use crate::stations::DEFAULT_CURRENT_STATION;

// ---------------------------------------------------------------------------
// Query parsing
// ---------------------------------------------------------------------------

/// Splits a request URL into (path, query parameters). Parameters without
/// a value are kept with an empty string; percent-encoding is decoded.
fn parse_url(url: &str) -> (&str, HashMap<String, String>) {
    let (path, query) = match url.split_once('?') {
        Some((p, q)) => (p, q),
        None => (url, ""),
    };

    let mut params = HashMap::new();
    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let value = urlencoding::decode(value)
            .map(|v| v.into_owned())
            .unwrap_or_else(|_| value.to_string());
        params.insert(key.to_string(), value);
    }

    (path, params)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Handle /health endpoint
fn handle_health() -> tiny_http::Response<std::io::Cursor<Vec<u8>>> {
    create_response(
        200,
        serde_json::json!({
            "status": "ok",
            "service": "marcon_service",
            "version": "0.1.0"
        }),
    )
}

/// Handle /stations endpoint
fn handle_stations(reconciler: &Reconciler) -> tiny_http::Response<std::io::Cursor<Vec<u8>>> {
    let stations: Vec<_> = reconciler
        .directory()
        .stations()
        .iter()
        .map(|s| {
            serde_json::json!({
                "code": s.code,
                "name": s.name,
                "latitude": s.latitude,
                "longitude": s.longitude,
                "available_series": s.available_series,
                "requires_flow_validation": s.requires_flow_validation,
            })
        })
        .collect();

    create_response(200, serde_json::json!({ "stations": stations }))
}

/// Handle /conditions endpoint
fn handle_conditions(
    reconciler: &Reconciler,
    params: &HashMap<String, String>,
) -> tiny_http::Response<std::io::Cursor<Vec<u8>>> {
    // Coordinates default to the default current station's location.
    let fallback = reconciler.directory().lookup(DEFAULT_CURRENT_STATION);
    let latitude = params
        .get("lat")
        .and_then(|v| v.parse().ok())
        .or(fallback.map(|s| s.latitude));
    let longitude = params
        .get("lon")
        .and_then(|v| v.parse().ok())
        .or(fallback.map(|s| s.longitude));

    let (latitude, longitude) = match (latitude, longitude) {
        (Some(lat), Some(lon)) => (lat, lon),
        _ => {
            return create_response(
                400,
                serde_json::json!({ "error": "lat and lon are required" }),
            );
        }
    };

    let request = ConditionsRequest {
        latitude,
        longitude,
        tide_station: params.get("tide_station").cloned(),
        current_station: params.get("current_station").cloned(),
        daylight: None,
    };

    match get_marine_conditions(reconciler, &request, &CancelToken::new()) {
        Ok(conditions) => create_response(200, serde_json::to_value(&conditions).unwrap()),
        Err(e @ (MarconError::LatitudeOutOfRange(_) | MarconError::LongitudeOutOfRange(_))) => {
            create_response(400, serde_json::json!({ "error": e.to_string() }))
        }
        Err(e) => create_response(502, serde_json::json!({ "error": e.to_string() })),
    }
}

/// Create HTTP response with JSON body
fn create_response(
    status_code: u16,
    json: serde_json::Value,
) -> tiny_http::Response<std::io::Cursor<Vec<u8>>> {
    let body = serde_json::to_string_pretty(&json).unwrap();
    let bytes = body.into_bytes();

    tiny_http::Response::from_data(bytes)
        .with_status_code(tiny_http::StatusCode::from(status_code))
        .with_header(
            tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap(),
        )
}

// ---------------------------------------------------------------------------
// HTTP Server
// ---------------------------------------------------------------------------

/// Start HTTP endpoint server on the specified port
pub fn start_endpoint_server(port: u16, reconciler: Reconciler) -> Result<(), String> {
    let server = tiny_http::Server::http(format!("0.0.0.0:{}", port))
        .map_err(|e| format!("Failed to start HTTP server: {}", e))?;

    println!("📡 HTTP endpoint listening on http://0.0.0.0:{}", port);
    println!("   GET /conditions?lat=..&lon=.. - Query marine conditions");
    println!("   GET /stations - List station registry");
    println!("   GET /health - Service health check\n");

    for request in server.incoming_requests() {
        let (path, params) = parse_url(request.url());

        let response = match path {
            "/health" => handle_health(),
            "/stations" => handle_stations(&reconciler),
            "/conditions" => handle_conditions(&reconciler, &params),
            _ => create_response(
                404,
                serde_json::json!({
                    "error": "Not found",
                    "available_endpoints": ["/health", "/stations", "/conditions"]
                }),
            ),
        };

        if let Err(e) = request.respond(response) {
            eprintln!("Failed to send response: {}", e);
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
