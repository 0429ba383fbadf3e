use chrono::{DateTime, Duration, TimeZone, Utc};
use drone_telemetry::TelemetryRecord;
use weather_forecast::data::ObservationFrame;
use weather_forecast::error::ForecastError;
use weather_forecast::merge::merge_telemetry_weather;

fn hour(h: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap() + Duration::hours(h)
}

fn telemetry_at(ts: DateTime<Utc>, temperature: f64) -> TelemetryRecord {
    TelemetryRecord {
        timestamp: ts,
        latitude: 10.85,
        longitude: 76.27,
        altitude: 120.0,
        speed: 14.2,
        heading: 270.0,
        temperature,
        humidity: 78.0,
    }
}

fn weather_frame(hours: usize) -> ObservationFrame {
    let timestamps: Vec<_> = (0..hours).map(|h| hour(h as i64)).collect();
    ObservationFrame::from_columns(
        &timestamps,
        vec![
            (
                "temperature_2m".to_string(),
                (0..hours).map(|h| 25.0 + h as f64).collect(),
            ),
            (
                "windspeed_10m".to_string(),
                (0..hours).map(|h| 10.0 + h as f64).collect(),
            ),
        ],
    )
    .unwrap()
}

#[test]
fn telemetry_joins_weather_for_its_hour() {
    let weather = weather_frame(3);
    let telemetry = vec![
        telemetry_at(hour(0) + Duration::minutes(10), 29.0),
        telemetry_at(hour(1) + Duration::minutes(45), 29.5),
    ];

    let outcome = merge_telemetry_weather(&telemetry, &weather).unwrap();

    assert_eq!(outcome.matched, 2);
    assert_eq!(outcome.dropped, 0);
    assert_eq!(outcome.frame.len(), 2);

    // Telemetry columns first, weather columns after, no suffix mangling
    assert!(outcome.frame.has_field("temperature"));
    assert!(outcome.frame.has_field("temperature_2m"));

    assert_eq!(
        outcome.frame.column("temperature_2m").unwrap(),
        vec![25.0, 26.0]
    );
    assert_eq!(outcome.frame.column("temperature").unwrap(), vec![29.0, 29.5]);

    // Merged rows keep the telemetry timestamps
    let timestamps = outcome.frame.timestamps().unwrap();
    assert_eq!(timestamps[0], hour(0) + Duration::minutes(10));
}

#[test]
fn unmatched_telemetry_is_dropped_and_counted() {
    let weather = weather_frame(2);
    let telemetry = vec![
        telemetry_at(hour(0), 29.0),
        telemetry_at(hour(5), 30.0), // no weather for this hour
    ];

    let outcome = merge_telemetry_weather(&telemetry, &weather).unwrap();
    assert_eq!(outcome.matched, 1);
    assert_eq!(outcome.dropped, 1);
}

#[test]
fn no_matches_at_all_is_an_error() {
    let weather = weather_frame(2);
    let telemetry = vec![telemetry_at(hour(10), 29.0)];

    assert!(matches!(
        merge_telemetry_weather(&telemetry, &weather),
        Err(ForecastError::DataError(_))
    ));
}

#[test]
fn empty_telemetry_is_an_error() {
    let weather = weather_frame(2);
    assert!(merge_telemetry_weather(&[], &weather).is_err());
}

#[test]
fn column_collision_is_rejected() {
    let timestamps = vec![hour(0)];
    let weather = ObservationFrame::from_columns(
        &timestamps,
        vec![("temperature".to_string(), vec![25.0])],
    )
    .unwrap();
    let telemetry = vec![telemetry_at(hour(0), 29.0)];

    match merge_telemetry_weather(&telemetry, &weather) {
        Err(ForecastError::DataError(msg)) => assert!(msg.contains("temperature")),
        other => panic!("expected DataError, got {:?}", other),
    }
}
