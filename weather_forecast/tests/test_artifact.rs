use chrono::{DateTime, Duration, TimeZone, Utc};
use tempfile::tempdir;
use weather_forecast::artifact::ModelBundle;
use weather_forecast::data::ObservationFrame;
use weather_forecast::dataset::build_dataset;
use weather_forecast::error::ForecastError;
use weather_forecast::models::linear::{LinearRegressor, TrainedLinearRegressor};
use weather_forecast::models::{Regressor, TrainedRegressor};
use weather_forecast::scaler::StandardScaler;

fn hourly(n: usize) -> Vec<DateTime<Utc>> {
    let start = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
    (0..n).map(|i| start + Duration::hours(i as i64)).collect()
}

fn training_frame() -> ObservationFrame {
    let temps: Vec<f64> = (0..24).map(|i| 20.0 + (i % 6) as f64).collect();
    let winds: Vec<f64> = (0..24).map(|i| 5.0 + (i % 4) as f64).collect();
    ObservationFrame::from_columns(
        &hourly(24),
        vec![
            ("temperature".to_string(), temps),
            ("wind_speed".to_string(), winds),
        ],
    )
    .unwrap()
}

fn trained_bundle(scaler: Option<StandardScaler>) -> ModelBundle<TrainedLinearRegressor> {
    let frame = training_frame();
    let dataset = build_dataset(
        &frame,
        &["temperature", "wind_speed"],
        &["temperature"],
        2,
    )
    .unwrap();

    let features = match &scaler {
        Some(s) => s.transform(&dataset.features).unwrap(),
        None => dataset.features.clone(),
    };
    let mut scaled = dataset.clone();
    scaled.features = features;

    let model = LinearRegressor::default().fit(&scaled).unwrap();
    ModelBundle::new(
        model,
        scaler,
        dataset.feature_names.clone(),
        dataset.target_names.clone(),
        dataset.horizon,
    )
}

#[test]
fn bundle_round_trips_through_json() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("models").join("weather_predictor.json");

    let bundle = trained_bundle(None);
    bundle.save(&path).unwrap();

    let loaded: ModelBundle<TrainedLinearRegressor> = ModelBundle::load(&path).unwrap();

    assert_eq!(loaded.feature_fields, bundle.feature_fields);
    assert_eq!(loaded.target_fields, bundle.target_fields);
    assert_eq!(loaded.horizon, bundle.horizon);
    assert_eq!(loaded.trained_at, bundle.trained_at);

    let query = vec![vec![22.0, 6.0]];
    assert_eq!(
        loaded.model.predict(&query).unwrap(),
        bundle.model.predict(&query).unwrap()
    );
}

#[test]
fn check_features_names_every_missing_column() {
    let bundle = trained_bundle(None);

    let frame = ObservationFrame::from_columns(
        &hourly(3),
        vec![("humidity".to_string(), vec![70.0, 71.0, 72.0])],
    )
    .unwrap();

    match bundle.check_features(&frame) {
        Err(ForecastError::MissingField { fields }) => {
            assert_eq!(
                fields,
                vec!["temperature".to_string(), "wind_speed".to_string()]
            );
        }
        other => panic!("expected MissingField, got {:?}", other),
    }
}

#[test]
fn feature_matrix_follows_training_column_order() {
    let bundle = trained_bundle(None);

    // Frame lists the columns in the opposite order; extraction must follow
    // the bundle's order, not the frame's.
    let frame = ObservationFrame::from_columns(
        &hourly(2),
        vec![
            ("wind_speed".to_string(), vec![6.0, 7.0]),
            ("temperature".to_string(), vec![22.0, 23.0]),
        ],
    )
    .unwrap();

    let matrix = bundle.feature_matrix(&frame).unwrap();
    assert_eq!(matrix, vec![vec![22.0, 6.0], vec![23.0, 7.0]]);
}

#[test]
fn bundled_scaler_is_applied_at_inference() {
    let frame = training_frame();
    let dataset = build_dataset(
        &frame,
        &["temperature", "wind_speed"],
        &["temperature"],
        2,
    )
    .unwrap();
    let scaler = StandardScaler::fit(&dataset.features).unwrap();
    let bundle = trained_bundle(Some(scaler.clone()));

    let matrix = bundle.feature_matrix(&frame).unwrap();

    let raw: Vec<Vec<f64>> = (0..frame.len())
        .map(|i| {
            vec![
                frame.column("temperature").unwrap()[i],
                frame.column("wind_speed").unwrap()[i],
            ]
        })
        .collect();
    assert_eq!(matrix, scaler.transform(&raw).unwrap());
}
