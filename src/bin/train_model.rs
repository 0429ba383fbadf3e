//! Train a forecast model on merged drone/weather observations.
//!
//! Reads a merged observation CSV (or merges a telemetry log with a weather
//! history CSV first), pairs each row with the row `--horizon` hours ahead,
//! trains the selected regressor per target, reports held-out accuracy, and
//! writes a self-describing model bundle.
//!
//! Usage: train_model --input data/merged_data.csv --horizon 12

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;
use weather_forecast::artifact::{ModelBundle, TrainedModel};
use weather_forecast::data::ObservationFrame;
use weather_forecast::dataset::{ForecastDatasetBuilder, SupervisedDataset};
use weather_forecast::merge::merge_telemetry_weather;
use weather_forecast::metrics::evaluate_targets;
use weather_forecast::models::boosting::{BoostingParams, GradientBoostingRegressor};
use weather_forecast::models::forest::{ForestParams, RandomForestRegressor};
use weather_forecast::models::linear::LinearRegressor;
use weather_forecast::models::multi::MultiOutputRegressor;
use weather_forecast::models::{Regressor, TrainedRegressor};
use weather_forecast::scaler::StandardScaler;

/// Feature columns of the merged table used when none are given explicitly.
const DEFAULT_FEATURES: &[&str] = &[
    "latitude",
    "longitude",
    "altitude",
    "speed",
    "heading",
    "temperature",
    "humidity",
    "cloudcover",
    "rain",
    "windspeed_10m",
];

/// Weather fields predicted when no targets are given explicitly.
const DEFAULT_TARGETS: &[&str] = &["temperature_2m", "relative_humidity_2m", "windspeed_10m"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ModelKind {
    Forest,
    Linear,
    Boosting,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Train a weather forecast model")]
struct Args {
    /// Merged observation CSV (alternative to --telemetry-log/--weather)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Telemetry flight log to merge with --weather
    #[arg(long, requires = "weather")]
    telemetry_log: Option<PathBuf>,

    /// Weather history CSV to merge with --telemetry-log
    #[arg(long, requires = "telemetry_log")]
    weather: Option<PathBuf>,

    /// Write the merged table here before training
    #[arg(long)]
    save_merged: Option<PathBuf>,

    /// Rows between each feature row and its target row
    #[arg(long, default_value = "12")]
    horizon: usize,

    /// Feature columns, comma separated
    #[arg(long, value_delimiter = ',')]
    features: Option<Vec<String>>,

    /// Target columns, comma separated
    #[arg(long, value_delimiter = ',')]
    targets: Option<Vec<String>>,

    /// Model family to train
    #[arg(long, value_enum, default_value = "forest")]
    model: ModelKind,

    /// Number of trees (forest) or boosting stages
    #[arg(long, default_value = "100")]
    estimators: usize,

    /// Maximum tree depth
    #[arg(long, default_value = "10")]
    max_depth: usize,

    /// Held-out fraction for evaluation
    #[arg(long, default_value = "0.2")]
    test_ratio: f64,

    /// Standardize features and bundle the scaler
    #[arg(long)]
    scale: bool,

    /// Output path for the model bundle
    #[arg(short, long, default_value = "models/weather_predictor.json")]
    output: PathBuf,
}

fn load_observations(args: &Args) -> Result<ObservationFrame> {
    let frame = match (&args.input, &args.telemetry_log, &args.weather) {
        (Some(input), None, None) => ObservationFrame::from_csv(input)
            .with_context(|| format!("failed to load {}", input.display()))?,
        (None, Some(telemetry_path), Some(weather_path)) => {
            let telemetry = drone_telemetry::TelemetryLog::new(telemetry_path)
                .load()
                .with_context(|| format!("failed to load {}", telemetry_path.display()))?;
            let weather = ObservationFrame::from_csv(weather_path)
                .with_context(|| format!("failed to load {}", weather_path.display()))?;

            let outcome = merge_telemetry_weather(&telemetry, &weather)?;
            println!(
                "Merged {} telemetry records with weather ({} dropped without a matching hour)",
                outcome.matched, outcome.dropped
            );

            if let Some(path) = &args.save_merged {
                outcome.frame.to_csv(path)?;
                println!("Merged table saved to {}", path.display());
            }
            outcome.frame
        }
        _ => bail!("provide either --input or both --telemetry-log and --weather"),
    };

    let frame = frame.strip_merge_suffixes()?;
    if frame.is_time_sorted()? {
        Ok(frame)
    } else {
        info!("observations not sorted by time, sorting");
        Ok(frame.sorted_by_time()?)
    }
}

fn fit_and_report<R>(
    regressor: &R,
    train: &SupervisedDataset,
    test: &SupervisedDataset,
) -> Result<R::Trained>
where
    R: Regressor,
{
    println!("Training {}...", regressor.name());
    let trained = regressor.fit(train)?;

    if test.is_empty() {
        println!("No held-out rows; skipping evaluation");
    } else {
        let predictions = trained.predict(&test.features)?;
        let report = evaluate_targets(&predictions, &test.targets, &test.target_names)?;
        print!("{}", report);
    }

    Ok(trained)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let frame = load_observations(&args)?;
    println!(
        "Loaded {} observations with fields: {}",
        frame.len(),
        frame.field_names().join(", ")
    );

    let features = args.features.clone().unwrap_or_else(|| {
        DEFAULT_FEATURES.iter().map(|s| s.to_string()).collect()
    });
    let targets = args.targets.clone().unwrap_or_else(|| {
        DEFAULT_TARGETS.iter().map(|s| s.to_string()).collect()
    });

    let builder = ForecastDatasetBuilder::new(features.clone(), targets.clone(), args.horizon)?;
    let dataset = builder.build(&frame)?;

    let (dataset, dropped) = dataset.drop_incomplete_targets();
    if dropped > 0 {
        info!(dropped, "dropped rows with missing target values");
    }
    if dataset.is_empty() {
        bail!("no complete training rows left after dropping missing targets");
    }

    let (mut train, mut test) = dataset.train_test_split(args.test_ratio)?;
    println!(
        "Dataset: {} training rows, {} held-out rows, horizon {} hours",
        train.n_samples(),
        test.n_samples(),
        args.horizon
    );

    let scaler = if args.scale {
        let scaler = StandardScaler::fit(&train.features)?;
        train.features = scaler.transform(&train.features)?;
        if !test.is_empty() {
            test.features = scaler.transform(&test.features)?;
        }
        Some(scaler)
    } else {
        None
    };

    let model = match args.model {
        ModelKind::Forest => {
            let forest = RandomForestRegressor::new(ForestParams {
                n_trees: args.estimators,
                max_depth: args.max_depth,
                ..ForestParams::default()
            });
            let regressor = MultiOutputRegressor::new(forest);
            TrainedModel::Forest(fit_and_report(&regressor, &train, &test)?)
        }
        ModelKind::Linear => {
            let regressor = LinearRegressor::default();
            TrainedModel::Linear(fit_and_report(&regressor, &train, &test)?)
        }
        ModelKind::Boosting => {
            let boosting = GradientBoostingRegressor::new(BoostingParams {
                n_estimators: args.estimators,
                max_depth: args.max_depth.min(4),
                ..BoostingParams::default()
            })?;
            let regressor = MultiOutputRegressor::new(boosting);
            TrainedModel::Boosting(fit_and_report(&regressor, &train, &test)?)
        }
    };

    let bundle = ModelBundle::new(model, scaler, features, targets, args.horizon);
    bundle.save(&args.output)?;
    println!("Model bundle saved to {}", args.output.display());

    Ok(())
}
