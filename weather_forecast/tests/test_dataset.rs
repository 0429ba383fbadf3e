use chrono::{DateTime, Duration, TimeZone, Utc};
use pretty_assertions::assert_eq;
use weather_forecast::data::ObservationFrame;
use weather_forecast::dataset::{build_dataset, ForecastDatasetBuilder};
use weather_forecast::error::ForecastError;

fn hourly_timestamps(n: usize) -> Vec<DateTime<Utc>> {
    let start = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
    (0..n).map(|i| start + Duration::hours(i as i64)).collect()
}

fn frame(columns: Vec<(&str, Vec<f64>)>) -> ObservationFrame {
    let n = columns[0].1.len();
    ObservationFrame::from_columns(
        &hourly_timestamps(n),
        columns
            .into_iter()
            .map(|(name, values)| (name.to_string(), values))
            .collect(),
    )
    .unwrap()
}

#[test]
fn worked_example_temperature_horizon_two() {
    let obs = frame(vec![("temperature", vec![10.0, 12.0, 14.0, 16.0, 18.0])]);

    let dataset = build_dataset(&obs, &["temperature"], &["temperature"], 2).unwrap();

    assert_eq!(dataset.n_samples(), 3);
    assert_eq!(dataset.features, vec![vec![10.0], vec![12.0], vec![14.0]]);
    assert_eq!(dataset.targets, vec![vec![14.0], vec![16.0], vec![18.0]]);
}

#[test]
fn output_length_is_rows_minus_horizon() {
    let obs = frame(vec![("temperature", (0..20).map(|i| i as f64).collect())]);

    for horizon in 1..20 {
        let dataset = build_dataset(&obs, &["temperature"], &["temperature"], horizon).unwrap();
        assert_eq!(dataset.n_samples(), 20 - horizon);
    }
}

#[test]
fn targets_are_exact_copies_of_future_rows() {
    let temps: Vec<f64> = (0..10).map(|i| 20.0 + 0.3 * i as f64).collect();
    let winds: Vec<f64> = (0..10).map(|i| 5.0 + 1.7 * i as f64).collect();
    let obs = frame(vec![
        ("temperature", temps.clone()),
        ("wind_speed", winds.clone()),
    ]);

    let horizon = 3;
    let dataset =
        build_dataset(&obs, &["temperature", "wind_speed"], &["wind_speed"], horizon).unwrap();

    for i in 0..dataset.n_samples() {
        assert_eq!(dataset.features[i], vec![temps[i], winds[i]]);
        assert_eq!(dataset.targets[i], vec![winds[i + horizon]]);
    }
}

#[test]
fn target_timestamps_trail_features_by_horizon_rows() {
    let obs = frame(vec![("temperature", (0..8).map(|i| i as f64).collect())]);
    let dataset = build_dataset(&obs, &["temperature"], &["temperature"], 2).unwrap();

    for i in 0..dataset.n_samples() {
        assert_eq!(
            dataset.target_timestamps[i] - dataset.feature_timestamps[i],
            Duration::hours(2)
        );
    }
}

#[test]
fn building_twice_yields_identical_output() {
    let obs = frame(vec![
        ("temperature", vec![10.0, 12.0, 14.0, 16.0, 18.0]),
        ("humidity", vec![70.0, 71.0, 72.0, 73.0, 74.0]),
    ]);
    let builder = ForecastDatasetBuilder::new(
        vec!["temperature".to_string(), "humidity".to_string()],
        vec!["temperature".to_string()],
        1,
    )
    .unwrap();

    assert_eq!(builder.build(&obs).unwrap(), builder.build(&obs).unwrap());
}

#[test]
fn horizon_of_rows_minus_one_yields_single_row() {
    let obs = frame(vec![("temperature", vec![10.0, 12.0, 14.0, 16.0, 18.0])]);
    let dataset = build_dataset(&obs, &["temperature"], &["temperature"], 4).unwrap();

    assert_eq!(dataset.n_samples(), 1);
    assert_eq!(dataset.features[0], vec![10.0]);
    assert_eq!(dataset.targets[0], vec![18.0]);
}

#[test]
fn horizon_at_or_beyond_rows_is_not_enough_data() {
    let obs = frame(vec![("temperature", vec![10.0, 12.0, 14.0])]);

    for horizon in [3, 4, 100] {
        match build_dataset(&obs, &["temperature"], &["temperature"], horizon) {
            Err(ForecastError::EmptyResult { rows, horizon: h }) => {
                assert_eq!(rows, 3);
                assert_eq!(h, horizon);
            }
            other => panic!("expected EmptyResult, got {:?}", other),
        }
    }
}

#[test]
fn zero_horizon_is_a_misconfiguration() {
    assert!(matches!(
        ForecastDatasetBuilder::new(
            vec!["temperature".to_string()],
            vec!["temperature".to_string()],
            0
        ),
        Err(ForecastError::InvalidHorizon)
    ));
}

#[test]
fn empty_field_lists_are_rejected() {
    assert!(matches!(
        ForecastDatasetBuilder::new(vec![], vec!["temperature".to_string()], 1),
        Err(ForecastError::InvalidParameter(_))
    ));
    assert!(matches!(
        ForecastDatasetBuilder::new(vec!["temperature".to_string()], vec![], 1),
        Err(ForecastError::InvalidParameter(_))
    ));
}

#[test]
fn missing_fields_are_all_named() {
    let obs = frame(vec![("temperature", vec![10.0, 12.0, 14.0])]);

    match build_dataset(
        &obs,
        &["temperature", "pressure"],
        &["visibility"],
        1,
    ) {
        Err(ForecastError::MissingField { fields }) => {
            assert_eq!(fields, vec!["pressure".to_string(), "visibility".to_string()]);
        }
        other => panic!("expected MissingField, got {:?}", other),
    }
}

#[test]
fn missing_field_check_runs_before_length_check() {
    // A schema problem should be reported as such even when the frame is
    // also too short for the horizon.
    let obs = frame(vec![("temperature", vec![10.0])]);

    assert!(matches!(
        build_dataset(&obs, &["pressure"], &["temperature"], 5),
        Err(ForecastError::MissingField { .. })
    ));
}

#[test]
fn nan_values_pass_through_exactly() {
    let obs = frame(vec![("temperature", vec![10.0, f64::NAN, 14.0, 16.0])]);
    let dataset = build_dataset(&obs, &["temperature"], &["temperature"], 2).unwrap();

    assert_eq!(dataset.n_samples(), 2);
    assert!(dataset.features[1].iter().all(|v| v.is_nan()));
    assert_eq!(dataset.targets[0], vec![14.0]);
}

#[test]
fn drop_incomplete_targets_removes_only_nan_target_rows() {
    let obs = frame(vec![("temperature", vec![10.0, 12.0, f64::NAN, 16.0, 18.0])]);
    let dataset = build_dataset(&obs, &["temperature"], &["temperature"], 1).unwrap();
    assert_eq!(dataset.n_samples(), 4);

    let (cleaned, dropped) = dataset.drop_incomplete_targets();
    assert_eq!(dropped, 1);
    assert_eq!(cleaned.n_samples(), 3);
    // The NaN feature row survives; only the NaN target pairing is gone
    assert!(cleaned.features.iter().any(|row| row[0].is_nan()));
    assert!(cleaned.targets.iter().all(|row| row[0].is_finite()));
}

#[test]
fn train_test_split_preserves_time_order() {
    let obs = frame(vec![("temperature", (0..12).map(|i| i as f64).collect())]);
    let dataset = build_dataset(&obs, &["temperature"], &["temperature"], 2).unwrap();

    let (train, test) = dataset.train_test_split(0.3).unwrap();
    assert_eq!(train.n_samples() + test.n_samples(), dataset.n_samples());
    assert!(train.feature_timestamps.last().unwrap() < test.feature_timestamps.first().unwrap());
}
