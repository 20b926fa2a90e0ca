//! Request orchestration
//!
//! Wires the encoders, feature assembly, the forest, and the training-fit
//! snapshot into the one read-only object request handlers share.

use crate::dataset::TrainingTable;
use crate::encoding::CategoryEncoder;
use crate::error::{PricerError, Result};
use crate::models::{FeatureVector, TrainingFitMetrics, NUM_FEATURES};
use crate::observability::PricerMetrics;
use crate::predictor::{
    evaluate, FeatureVectorBuilder, RandomForestRegressor, RawDiamond, DEFAULT_MAX_DEPTH,
    DEFAULT_N_TREES, DEFAULT_SEED,
};
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Hyperparameters for the one-shot training run
#[derive(Debug, Clone)]
pub struct TrainingOptions {
    pub n_trees: usize,
    pub max_depth: usize,
    pub seed: u64,
}

impl Default for TrainingOptions {
    fn default() -> Self {
        Self {
            n_trees: DEFAULT_N_TREES,
            max_depth: DEFAULT_MAX_DEPTH,
            seed: DEFAULT_SEED,
        }
    }
}

/// The fitted pipeline: encoders, forest, and the metrics snapshot.
///
/// Constructed once at startup and never mutated afterwards, so request
/// handlers can share it behind an `Arc` without locking.
pub struct PredictionService {
    builder: FeatureVectorBuilder,
    model: RandomForestRegressor,
    fit_metrics: TrainingFitMetrics,
    telemetry: PricerMetrics,
}

impl PredictionService {
    /// Fits the full pipeline from a training table.
    ///
    /// Encoders are fitted per categorical column, the table is encoded
    /// into numeric rows, the forest is trained, and the fit snapshot is
    /// computed, in that order. Any failure here is fatal: there is no
    /// degraded mode for serving estimates without a fitted model.
    pub fn fit(table: &TrainingTable, options: &TrainingOptions) -> Result<Self> {
        let started = Instant::now();

        let cut = CategoryEncoder::fit(table.records().iter().map(|r| r.cut.as_str()));
        let color = CategoryEncoder::fit(table.records().iter().map(|r| r.color.as_str()));
        let clarity = CategoryEncoder::fit(table.records().iter().map(|r| r.clarity.as_str()));

        let rows: Vec<[f64; NUM_FEATURES]> = table
            .records()
            .iter()
            .map(|r| {
                FeatureVector {
                    carat: r.carat,
                    cut_code: cut.encode(&r.cut) as f64,
                    color_code: color.encode(&r.color) as f64,
                    clarity_code: clarity.encode(&r.clarity) as f64,
                    depth: r.depth,
                    table: r.table,
                    x: r.x,
                    y: r.y,
                    z: r.z,
                }
                .to_row()
            })
            .collect();
        let prices = table.prices();

        let mut model =
            RandomForestRegressor::new(options.n_trees, options.max_depth, options.seed);
        model.fit(&rows, &prices)?;

        let fit_metrics = evaluate(&model, &rows, &prices);

        let telemetry = PricerMetrics::new();
        telemetry.set_training_rows(table.len() as i64);
        telemetry.set_training_duration(started.elapsed().as_secs_f64());
        telemetry.set_model_info(options.n_trees, options.max_depth);

        info!(
            event = "model_fitted",
            rows = table.len(),
            n_trees = options.n_trees,
            max_depth = options.max_depth,
            r2 = fit_metrics.r2,
            rmse = fit_metrics.rmse,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Fitted pricing model"
        );

        Ok(Self {
            builder: FeatureVectorBuilder::new(cut, color, clarity),
            model,
            fit_metrics,
            telemetry,
        })
    }

    /// Training-fit accuracy snapshot (in-sample, computed once at fit).
    pub fn training_fit_metrics(&self) -> &TrainingFitMetrics {
        &self.fit_metrics
    }

    /// Handles one inference request from raw form fields.
    ///
    /// Ok carries the display string for a successful estimate; Err
    /// carries a renderable message. Malformed input never escapes as a
    /// panic or a 5xx out of the pipeline.
    pub fn handle_prediction_request(
        &self,
        fields: &HashMap<String, String>,
    ) -> std::result::Result<String, String> {
        match self.predict_price(fields) {
            Ok(price) => Ok(format!("Predicted Diamond Price: {}", format_usd(price))),
            Err(err) => {
                self.telemetry.inc_predictions_rejected();
                warn!(event = "prediction_rejected", error = %err, "Rejected prediction request");
                Err(format!("Error: {err}"))
            }
        }
    }

    /// Point estimate for one request.
    ///
    /// The three grade fields degrade to the encoder fallback when absent
    /// or unrecognized; the six numeric fields are required and must
    /// parse.
    pub fn predict_price(&self, fields: &HashMap<String, String>) -> Result<f64> {
        let raw = RawDiamond {
            carat: require_field(fields, "carat")?,
            cut: optional_field(fields, "cut"),
            color: optional_field(fields, "color"),
            clarity: optional_field(fields, "clarity"),
            depth: require_field(fields, "depth")?,
            table: require_field(fields, "table")?,
            x: require_field(fields, "x")?,
            y: require_field(fields, "y")?,
            z: require_field(fields, "z")?,
        };
        let vector = self.builder.build(&raw)?;

        let started = Instant::now();
        let price = self.model.predict(&vector.to_row());
        let elapsed = started.elapsed();

        self.telemetry
            .observe_prediction_latency(elapsed.as_secs_f64());
        self.telemetry.inc_predictions_served();
        debug!(
            event = "prediction_served",
            price,
            elapsed_us = elapsed.as_micros() as u64,
            "Served price estimate"
        );
        Ok(price)
    }
}

fn require_field<'a>(
    fields: &'a HashMap<String, String>,
    name: &'static str,
) -> Result<&'a str> {
    fields
        .get(name)
        .map(String::as_str)
        .ok_or(PricerError::MissingField(name))
}

fn optional_field<'a>(fields: &'a HashMap<String, String>, name: &str) -> &'a str {
    fields.get(name).map(String::as_str).unwrap_or("")
}

/// Formats a price as US dollars with comma thousands separators and two
/// decimal places.
pub fn format_usd(amount: f64) -> String {
    let negative = amount < 0.0;
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let fraction = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if negative { "-" } else { "" };
    format!("{sign}${grouped}.{fraction:02}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DiamondRecord;

    fn record(
        carat: f64,
        cut: &str,
        color: &str,
        clarity: &str,
        price: f64,
    ) -> DiamondRecord {
        DiamondRecord {
            carat,
            cut: cut.to_string(),
            color: color.to_string(),
            clarity: clarity.to_string(),
            depth: 61.5,
            table: 55.0,
            price,
            x: carat * 6.2,
            y: carat * 6.2,
            z: carat * 3.8,
        }
    }

    /// Small table introducing every grade in canonical order, with
    /// prices roughly increasing in carat.
    fn sample_table() -> TrainingTable {
        let cuts = ["Fair", "Good", "Very Good", "Premium", "Ideal"];
        let colors = ["D", "E", "F", "G", "H", "I", "J"];
        let clarities = ["I1", "SI2", "SI1", "VS2", "VS1", "VVS2", "VVS1"];

        let records: Vec<DiamondRecord> = (0..35)
            .map(|i| {
                let carat = 0.25 + 0.05 * i as f64;
                record(
                    carat,
                    cuts[i % cuts.len()],
                    colors[i % colors.len()],
                    clarities[i % clarities.len()],
                    800.0 + 4200.0 * carat,
                )
            })
            .collect();
        TrainingTable::from_records(records).expect("non-empty table")
    }

    fn quick_options() -> TrainingOptions {
        TrainingOptions {
            n_trees: 12,
            max_depth: 5,
            seed: 42,
        }
    }

    fn form(entries: &[(&str, &str)]) -> HashMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn valid_form() -> HashMap<String, String> {
        form(&[
            ("carat", "1.0"),
            ("cut", "Ideal"),
            ("color", "G"),
            ("clarity", "VS1"),
            ("depth", "61.5"),
            ("table", "55"),
            ("x", "6.4"),
            ("y", "6.4"),
            ("z", "4.0"),
        ])
    }

    #[test]
    fn test_fit_then_predict_formats_a_price() {
        let service = PredictionService::fit(&sample_table(), &quick_options()).expect("fit");
        let text = service
            .handle_prediction_request(&valid_form())
            .expect("prediction");

        assert!(
            text.starts_with("Predicted Diamond Price: $"),
            "got: {text}"
        );
        // two decimals at the end
        let amount = text.rsplit('$').next().unwrap();
        let (_, decimals) = amount.rsplit_once('.').expect("decimal point");
        assert_eq!(decimals.len(), 2);
    }

    #[test]
    fn test_predicted_price_is_nonnegative_and_within_label_range() {
        let table = sample_table();
        let service = PredictionService::fit(&table, &quick_options()).expect("fit");
        let price = service.predict_price(&valid_form()).expect("predict");

        let max_price = table
            .prices()
            .into_iter()
            .fold(f64::NEG_INFINITY, f64::max);
        assert!(price >= 0.0);
        assert!(price <= max_price);
    }

    #[test]
    fn test_non_numeric_field_becomes_an_error_string() {
        let service = PredictionService::fit(&sample_table(), &quick_options()).expect("fit");
        let mut fields = valid_form();
        fields.insert("depth".to_string(), "deep".to_string());

        let err = service.handle_prediction_request(&fields).unwrap_err();
        assert!(err.starts_with("Error: "), "got: {err}");
        assert!(err.contains("depth"));
    }

    #[test]
    fn test_missing_numeric_field_becomes_an_error_string() {
        let service = PredictionService::fit(&sample_table(), &quick_options()).expect("fit");
        let mut fields = valid_form();
        fields.remove("carat");

        let err = service.handle_prediction_request(&fields).unwrap_err();
        assert!(err.contains("Error"));
        assert!(err.contains("carat"));
    }

    #[test]
    fn test_unknown_grades_are_coerced_not_rejected() {
        let service = PredictionService::fit(&sample_table(), &quick_options()).expect("fit");
        let mut fields = valid_form();
        fields.insert("cut".to_string(), "Magnificent".to_string());
        fields.remove("clarity");

        assert!(service.handle_prediction_request(&fields).is_ok());
    }

    #[test]
    fn test_repeated_requests_return_identical_estimates() {
        let service = PredictionService::fit(&sample_table(), &quick_options()).expect("fit");
        let first = service.predict_price(&valid_form()).expect("predict");
        for _ in 0..3 {
            assert_eq!(service.predict_price(&valid_form()).expect("predict"), first);
        }
    }

    #[test]
    fn test_fit_metrics_snapshot_is_plausible() {
        let service = PredictionService::fit(&sample_table(), &quick_options()).expect("fit");
        let metrics = service.training_fit_metrics();

        assert_eq!(metrics.n_samples, 35);
        assert!(metrics.mse >= 0.0);
        assert!((metrics.rmse - metrics.mse.sqrt()).abs() < 1e-9);
        assert!(metrics.r2 <= 1.0);
    }

    #[test]
    fn test_format_usd() {
        assert_eq!(format_usd(1234.56), "$1,234.56");
        assert_eq!(format_usd(0.5), "$0.50");
        assert_eq!(format_usd(999.999), "$1,000.00");
        assert_eq!(format_usd(1234567.891), "$1,234,567.89");
        assert_eq!(format_usd(-42.0), "-$42.00");
        assert_eq!(format_usd(0.0), "$0.00");
    }
}
