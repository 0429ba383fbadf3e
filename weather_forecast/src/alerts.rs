//! Threshold alerts over predicted weather

use serde::{Deserialize, Serialize};

/// Alert thresholds for a predicted row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertThresholds {
    /// Rainfall threshold in millimeters
    pub rain_mm: f64,
    /// Cloud cover threshold in percent
    pub cloud_cover_pct: f64,
    /// Wind speed threshold in km/h
    pub wind_speed_kmh: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            rain_mm: 5.0,
            cloud_cover_pct: 80.0,
            wind_speed_kmh: 30.0,
        }
    }
}

/// A triggered weather warning, carrying the predicted value
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherAlert {
    HeavyRain(f64),
    HighCloudCover(f64),
    StrongWind(f64),
}

impl std::fmt::Display for WeatherAlert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WeatherAlert::HeavyRain(mm) => {
                write!(f, "Heavy rainfall predicted: {:.1} mm", mm)
            }
            WeatherAlert::HighCloudCover(pct) => {
                write!(f, "High cloud cover: {:.0}%", pct)
            }
            WeatherAlert::StrongWind(kmh) => {
                write!(f, "Strong winds: {:.1} km/h", kmh)
            }
        }
    }
}

impl AlertThresholds {
    /// Check one predicted target row against the thresholds.
    ///
    /// Targets are matched to thresholds by name: anything containing
    /// `rain`, `cloud`, or `wind` is compared against the corresponding
    /// limit with a strict `>`. Unrecognized targets never alert.
    pub fn evaluate(&self, target_names: &[String], predicted: &[f64]) -> Vec<WeatherAlert> {
        let mut alerts = Vec::new();
        for (name, &value) in target_names.iter().zip(predicted.iter()) {
            let lower = name.to_lowercase();
            if lower.contains("rain") && value > self.rain_mm {
                alerts.push(WeatherAlert::HeavyRain(value));
            } else if lower.contains("cloud") && value > self.cloud_cover_pct {
                alerts.push(WeatherAlert::HighCloudCover(value));
            } else if lower.contains("wind") && value > self.wind_speed_kmh {
                alerts.push(WeatherAlert::StrongWind(value));
            }
        }
        alerts
    }
}
