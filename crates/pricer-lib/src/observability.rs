//! Observability infrastructure
//!
//! Prometheus metrics for the pricing service: request latency, served
//! and rejected predictions, and the one-shot training run.

use prometheus::{
    register_gauge, register_gauge_vec, register_histogram, register_int_counter,
    register_int_gauge, Gauge, GaugeVec, Histogram, IntCounter, IntGauge,
};
use std::sync::OnceLock;

/// Histogram buckets for prediction latency (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<PricerMetricsInner> = OnceLock::new();

struct PricerMetricsInner {
    prediction_latency_seconds: Histogram,
    predictions_served: IntCounter,
    predictions_rejected: IntCounter,
    training_rows: IntGauge,
    training_duration_seconds: Gauge,
    model_info: GaugeVec,
}

impl PricerMetricsInner {
    fn new() -> Self {
        Self {
            prediction_latency_seconds: register_histogram!(
                "diamond_pricer_prediction_latency_seconds",
                "Time spent running model inference for one request",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register prediction_latency_seconds"),

            predictions_served: register_int_counter!(
                "diamond_pricer_predictions_served_total",
                "Total number of price estimates served"
            )
            .expect("Failed to register predictions_served_total"),

            predictions_rejected: register_int_counter!(
                "diamond_pricer_predictions_rejected_total",
                "Total number of requests rejected for invalid input"
            )
            .expect("Failed to register predictions_rejected_total"),

            training_rows: register_int_gauge!(
                "diamond_pricer_training_rows",
                "Number of rows in the training table the model was fitted on"
            )
            .expect("Failed to register training_rows"),

            training_duration_seconds: register_gauge!(
                "diamond_pricer_training_duration_seconds",
                "Wall-clock duration of the one-shot model fit"
            )
            .expect("Failed to register training_duration_seconds"),

            model_info: register_gauge_vec!(
                "diamond_pricer_model_info",
                "Hyperparameters of the fitted forest",
                &["n_trees", "max_depth"]
            )
            .expect("Failed to register model_info"),
        }
    }
}

/// Metrics handle for Prometheus exposition.
///
/// A lightweight handle to the global metrics instance; clones share the
/// same underlying metrics.
#[derive(Clone)]
pub struct PricerMetrics {
    _private: (),
}

impl Default for PricerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl PricerMetrics {
    /// Creates a handle, initializing the global metrics on first call.
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(PricerMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &PricerMetricsInner {
        GLOBAL_METRICS.get().expect("Metrics not initialized")
    }

    pub fn observe_prediction_latency(&self, duration_secs: f64) {
        self.inner().prediction_latency_seconds.observe(duration_secs);
    }

    pub fn inc_predictions_served(&self) {
        self.inner().predictions_served.inc();
    }

    pub fn inc_predictions_rejected(&self) {
        self.inner().predictions_rejected.inc();
    }

    pub fn set_training_rows(&self, rows: i64) {
        self.inner().training_rows.set(rows);
    }

    pub fn set_training_duration(&self, duration_secs: f64) {
        self.inner().training_duration_seconds.set(duration_secs);
    }

    /// Records the fitted forest's hyperparameters.
    pub fn set_model_info(&self, n_trees: usize, max_depth: usize) {
        self.inner().model_info.reset();
        self.inner()
            .model_info
            .with_label_values(&[&n_trees.to_string(), &max_depth.to_string()])
            .set(1.0);
    }
}
