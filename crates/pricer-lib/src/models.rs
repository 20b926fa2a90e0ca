//! Core data models for the pricing service

use serde::{Deserialize, Serialize};

/// Number of columns in the model's input
pub const NUM_FEATURES: usize = 9;

/// One historical diamond sale from the training table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiamondRecord {
    pub carat: f64,
    pub cut: String,
    pub color: String,
    pub clarity: String,
    pub depth: f64,
    pub table: f64,
    pub price: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Numeric feature vector for one inference request.
///
/// `to_row` fixes the column order the model is trained on; encoding and
/// training both depend on that order staying put.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    pub carat: f64,
    pub cut_code: f64,
    pub color_code: f64,
    pub clarity_code: f64,
    pub depth: f64,
    pub table: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl FeatureVector {
    /// The vector as a model input row:
    /// carat, cut, color, clarity, depth, table, x, y, z.
    pub fn to_row(&self) -> [f64; NUM_FEATURES] {
        [
            self.carat,
            self.cut_code,
            self.color_code,
            self.clarity_code,
            self.depth,
            self.table,
            self.x,
            self.y,
            self.z,
        ]
    }
}

/// Accuracy of the fitted model measured against its own training rows.
///
/// These figures describe fit quality, not generalization: the model is
/// evaluated on the same table it was trained on, so they are optimistic
/// relative to performance on unseen diamonds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingFitMetrics {
    pub mse: f64,
    pub rmse: f64,
    pub mae: f64,
    pub r2: f64,
    pub mape_percent: f64,
    pub n_samples: usize,
    pub computed_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_row_order() {
        let vector = FeatureVector {
            carat: 1.0,
            cut_code: 2.0,
            color_code: 3.0,
            clarity_code: 4.0,
            depth: 5.0,
            table: 6.0,
            x: 7.0,
            y: 8.0,
            z: 9.0,
        };
        assert_eq!(
            vector.to_row(),
            [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]
        );
    }
}
