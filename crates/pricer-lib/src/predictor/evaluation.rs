//! Regression accuracy metrics
//!
//! All figures are computed over the rows the model was fitted on. They
//! describe how closely the forest reproduces its own training table and
//! say nothing about accuracy on unseen diamonds; the snapshot type is
//! named accordingly.

use super::forest::RandomForestRegressor;
use crate::models::{TrainingFitMetrics, NUM_FEATURES};

/// Mean squared error.
pub fn mse(predicted: &[f64], actual: &[f64]) -> f64 {
    assert_eq!(predicted.len(), actual.len(), "length mismatch");
    assert!(!actual.is_empty(), "metrics need at least one sample");

    let sum: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    sum / actual.len() as f64
}

/// Root mean squared error.
pub fn rmse(predicted: &[f64], actual: &[f64]) -> f64 {
    mse(predicted, actual).sqrt()
}

/// Mean absolute error.
pub fn mae(predicted: &[f64], actual: &[f64]) -> f64 {
    assert_eq!(predicted.len(), actual.len(), "length mismatch");
    assert!(!actual.is_empty(), "metrics need at least one sample");

    let sum: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).abs())
        .sum();
    sum / actual.len() as f64
}

/// Coefficient of determination, R² = 1 − SS_res / SS_tot.
///
/// Returns 0.0 when the targets are constant (SS_tot is zero).
pub fn r_squared(predicted: &[f64], actual: &[f64]) -> f64 {
    assert_eq!(predicted.len(), actual.len(), "length mismatch");

    let mean = actual.iter().sum::<f64>() / actual.len() as f64;
    let ss_res: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();

    if ss_tot == 0.0 {
        return 0.0;
    }
    1.0 - ss_res / ss_tot
}

/// Mean absolute percentage error, as a percentage.
///
/// Undefined for a zero label; the training table is required to carry
/// strictly positive prices, which is not re-checked here.
pub fn mape(predicted: &[f64], actual: &[f64]) -> f64 {
    assert_eq!(predicted.len(), actual.len(), "length mismatch");
    assert!(!actual.is_empty(), "metrics need at least one sample");

    let sum: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| ((a - p) / a).abs())
        .sum();
    sum / actual.len() as f64 * 100.0
}

/// Snapshots the fitted forest's accuracy against its own training rows.
pub fn evaluate(
    model: &RandomForestRegressor,
    rows: &[[f64; NUM_FEATURES]],
    prices: &[f64],
) -> TrainingFitMetrics {
    let predicted: Vec<f64> = rows.iter().map(|row| model.predict(row)).collect();

    let mse_value = mse(&predicted, prices);
    TrainingFitMetrics {
        mse: mse_value,
        rmse: mse_value.sqrt(),
        mae: mae(&predicted, prices),
        r2: r_squared(&predicted, prices),
        mape_percent: mape(&predicted, prices),
        n_samples: prices.len(),
        computed_at: chrono::Utc::now().timestamp(),
    }
}
