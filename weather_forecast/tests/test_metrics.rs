use approx::assert_relative_eq;
use weather_forecast::metrics::{evaluate, evaluate_targets};

#[test]
fn perfect_prediction_scores_zero_error() {
    let actual = vec![1.0, 2.0, 3.0, 4.0];
    let metrics = evaluate(&actual, &actual).unwrap();

    assert_relative_eq!(metrics.rmse, 0.0, epsilon = 1e-12);
    assert_relative_eq!(metrics.mae, 0.0, epsilon = 1e-12);
    assert_relative_eq!(metrics.r2, 1.0, epsilon = 1e-12);
}

#[test]
fn constant_offset_shows_in_mae_and_rmse() {
    let predicted = vec![2.0, 3.0, 4.0];
    let actual = vec![1.0, 2.0, 3.0];
    let metrics = evaluate(&predicted, &actual).unwrap();

    assert_relative_eq!(metrics.mae, 1.0, epsilon = 1e-12);
    assert_relative_eq!(metrics.rmse, 1.0, epsilon = 1e-12);
    assert!(metrics.r2 < 1.0);
}

#[test]
fn r2_is_zero_when_actuals_are_constant() {
    let metrics = evaluate(&[1.0, 2.0], &[5.0, 5.0]).unwrap();
    assert_eq!(metrics.r2, 0.0);
}

#[test]
fn mismatched_lengths_are_rejected() {
    assert!(evaluate(&[1.0], &[1.0, 2.0]).is_err());
    assert!(evaluate(&[], &[]).is_err());
}

#[test]
fn per_target_report_keeps_target_order() {
    let predicted = vec![vec![1.0, 10.0], vec![2.0, 22.0]];
    let actual = vec![vec![1.0, 12.0], vec![2.0, 20.0]];
    let names = vec!["temperature".to_string(), "wind_speed".to_string()];

    let report = evaluate_targets(&predicted, &actual, &names).unwrap();

    assert_eq!(report.per_target.len(), 2);
    assert_eq!(report.per_target[0].0, "temperature");
    assert_relative_eq!(report.per_target[0].1.mae, 0.0, epsilon = 1e-12);
    assert_relative_eq!(report.per_target[1].1.mae, 2.0, epsilon = 1e-12);

    let rendered = format!("{}", report);
    assert!(rendered.contains("wind_speed"));
    assert!(rendered.contains("RMSE"));
}

#[test]
fn per_target_report_rejects_ragged_rows() {
    let predicted = vec![vec![1.0]];
    let actual = vec![vec![1.0, 2.0]];
    let names = vec!["a".to_string(), "b".to_string()];
    assert!(evaluate_targets(&predicted, &actual, &names).is_err());
}
