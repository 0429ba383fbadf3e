//! Produce a weather forecast from a saved model bundle.
//!
//! Loads the bundle, validates the input table against the bundle's
//! feature-field list, predicts each target `horizon` hours ahead, renders
//! the latest forecast with any threshold alerts, and optionally writes all
//! predictions as CSV. With `--watch` the cycle repeats on an interval.
//!
//! Usage: predict_weather --model models/weather_predictor.json --input data/latest_drone_log.csv

use anyhow::{Context, Result};
use chrono::Duration;
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use weather_forecast::alerts::AlertThresholds;
use weather_forecast::artifact::{ModelBundle, TrainedModel};
use weather_forecast::data::ObservationFrame;
use weather_forecast::models::TrainedRegressor;

#[derive(Parser, Debug)]
#[command(author, version, about = "Predict upcoming weather from recent observations")]
struct Args {
    /// Path of the saved model bundle
    #[arg(short, long, default_value = "models/weather_predictor.json")]
    model: PathBuf,

    /// Observation CSV carrying the bundle's feature columns
    #[arg(short, long, default_value = "data/latest_drone_log.csv")]
    input: PathBuf,

    /// Write every prediction row here as CSV
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Re-run every N seconds instead of predicting once
    #[arg(short, long)]
    watch: Option<u64>,

    /// Rainfall alert threshold in mm
    #[arg(long, default_value = "5.0")]
    rain_threshold: f64,

    /// Cloud cover alert threshold in percent
    #[arg(long, default_value = "80.0")]
    cloud_threshold: f64,

    /// Wind speed alert threshold in km/h
    #[arg(long, default_value = "30.0")]
    wind_threshold: f64,
}

fn predict_once(
    bundle: &ModelBundle<TrainedModel>,
    thresholds: &AlertThresholds,
    args: &Args,
) -> Result<()> {
    let frame = ObservationFrame::from_csv(&args.input)
        .with_context(|| format!("failed to load {}", args.input.display()))?
        .strip_merge_suffixes()?;

    if frame.is_empty() {
        anyhow::bail!("{} holds no observations", args.input.display());
    }

    let matrix = bundle.feature_matrix(&frame)?;
    let predictions = bundle.model.predict(&matrix)?;

    let timestamps = frame.timestamps()?;
    let future: Vec<_> = timestamps
        .iter()
        .map(|ts| *ts + Duration::hours(bundle.horizon as i64))
        .collect();

    if let Some(path) = &args.output {
        write_predictions(path, bundle, &future, &predictions)?;
        println!("{} predictions saved to {}", predictions.len(), path.display());
    }

    // Render the forecast from the most recent observation
    let last = predictions.len() - 1;
    println!("\nForecast for {}:", future[last]);
    for (name, value) in bundle.target_fields.iter().zip(predictions[last].iter()) {
        println!("  {}: {:.1}", name, value);
    }

    let alerts = thresholds.evaluate(&bundle.target_fields, &predictions[last]);
    if alerts.is_empty() {
        println!("Weather looks good for the next {} hours.", bundle.horizon);
    } else {
        println!("WEATHER ALERTS for the next {} hours:", bundle.horizon);
        for alert in alerts {
            println!("  - {}", alert);
        }
    }

    Ok(())
}

fn write_predictions(
    path: &PathBuf,
    bundle: &ModelBundle<TrainedModel>,
    future: &[chrono::DateTime<chrono::Utc>],
    predictions: &[Vec<f64>],
) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut writer = csv::Writer::from_path(path)?;
    let mut header = vec!["time".to_string()];
    header.extend(
        bundle
            .target_fields
            .iter()
            .map(|name| format!("predicted_{}", name)),
    );
    writer.write_record(&header)?;

    for (ts, row) in future.iter().zip(predictions.iter()) {
        let mut record = vec![ts.to_rfc3339()];
        record.extend(row.iter().map(|v| v.to_string()));
        writer.write_record(&record)?;
    }
    writer.flush()?;

    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let bundle: ModelBundle<TrainedModel> = ModelBundle::load(&args.model)
        .with_context(|| format!("failed to load model bundle {}", args.model.display()))?;
    info!(
        model = bundle.model.name(),
        horizon = bundle.horizon,
        trained_at = %bundle.trained_at,
        "loaded model bundle"
    );

    let thresholds = AlertThresholds {
        rain_mm: args.rain_threshold,
        cloud_cover_pct: args.cloud_threshold,
        wind_speed_kmh: args.wind_threshold,
    };

    match args.watch {
        None => predict_once(&bundle, &thresholds, &args),
        Some(interval) => loop {
            // Keep the loop alive through transient input problems
            if let Err(e) = predict_once(&bundle, &thresholds, &args) {
                error!(error = %e, "prediction cycle failed");
            }
            info!(interval, "sleeping before next prediction");
            std::thread::sleep(std::time::Duration::from_secs(interval));
        },
    }
}
