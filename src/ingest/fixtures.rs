/// Test fixtures: representative JSON payloads from the IWLS and marine
/// model APIs.
///
/// These fixtures are structurally complete but truncated to the minimum
/// needed to exercise the parsers.
///
/// IWLS station data shape (flat array):
///   [ { "eventDate": ISO 8601, "value": number, "qualifier"?: string } ]
/// Extrema series ("wlp-hilo", "wcsp-extrema") carry qualifiers such as
/// "SLACK", "EXTREMA_FLOOD", "EXTREMA_EBB", "HIGH", "LOW"; hourly series
/// do not.
///
/// Marine model shape:
///   response.hourly.time[]                   — "YYYY-MM-DDTHH:MM" in UTC
///   response.hourly.ocean_current_velocity[] — km/h, nullable
///   (direction, wave_height, sea_surface_temperature, sea_level_height_msl
///    follow the same parallel-array pattern)

/// Point Atkinson hourly water level predictions ("wlp"), deliberately out
/// of order to exercise the parser's sort.
pub(crate) fn fixture_tide_predictions_json() -> &'static str {
    r#"[
      { "eventDate": "2026-08-29T01:00:00Z", "value": 3.24 },
      { "eventDate": "2026-08-29T00:00:00Z", "value": 2.91 },
      { "eventDate": "2026-08-29T02:00:00Z", "value": 3.41 },
      { "eventDate": "2026-08-29T03:00:00Z", "value": 3.18 }
    ]"#
}

/// Active Pass current extrema ("wcsp-extrema") with qualifiers — one full
/// slack/flood/slack/ebb sequence. Flood and ebb speeds are signed the way
/// the station network publishes them.
pub(crate) fn fixture_current_extrema_json() -> &'static str {
    r#"[
      { "eventDate": "2026-08-29T01:40:00Z", "value": 0.1,  "qualifier": "SLACK" },
      { "eventDate": "2026-08-29T04:55:00Z", "value": 4.8,  "qualifier": "EXTREMA_FLOOD" },
      { "eventDate": "2026-08-29T08:10:00Z", "value": 0.0,  "qualifier": "SLACK" },
      { "eventDate": "2026-08-29T11:20:00Z", "value": -5.2, "qualifier": "EXTREMA_EBB" }
    ]"#
}

/// Extrema records without qualifiers — older stations omit them, leaving
/// classification to the sign/magnitude of the value.
pub(crate) fn fixture_extrema_without_qualifiers_json() -> &'static str {
    r#"[
      { "eventDate": "2026-08-29T01:40:00Z", "value": 0.05 },
      { "eventDate": "2026-08-29T04:55:00Z", "value": 3.6 },
      { "eventDate": "2026-08-29T08:10:00Z", "value": -0.08 },
      { "eventDate": "2026-08-29T11:20:00Z", "value": -4.1 }
    ]"#
}

/// Point Atkinson hi-lo records ("wlp-hilo") without qualifiers; high vs.
/// low is recovered by neighbor comparison.
pub(crate) fn fixture_tide_hilo_json() -> &'static str {
    r#"[
      { "eventDate": "2026-08-29T02:30:00Z", "value": 4.4 },
      { "eventDate": "2026-08-29T08:45:00Z", "value": 0.9 },
      { "eventDate": "2026-08-29T15:10:00Z", "value": 4.1 },
      { "eventDate": "2026-08-29T21:20:00Z", "value": 1.3 }
    ]"#
}

/// Marine model forecast for six hours. The first velocity is exactly one
/// knot in km/h; the third wave_height is null (model gap).
pub(crate) fn fixture_model_forecast_json() -> &'static str {
    r#"{
      "latitude": 48.875,
      "longitude": -123.3125,
      "hourly": {
        "time": [
          "2026-08-29T00:00", "2026-08-29T01:00", "2026-08-29T02:00",
          "2026-08-29T03:00", "2026-08-29T04:00", "2026-08-29T05:00"
        ],
        "ocean_current_velocity": [1.852, 2.9, 1.1, 0.6, 2.2, 3.7],
        "ocean_current_direction": [95.0, 100.0, 110.0, 250.0, 260.0, 255.0],
        "wave_height": [0.4, 0.5, null, 0.3, 0.2, 0.2],
        "sea_surface_temperature": [14.2, 14.1, 14.1, 14.0, 13.9, 13.9],
        "sea_level_height_msl": [0.8, 1.2, 1.5, 1.4, 1.0, 0.5]
      }
    }"#
}
