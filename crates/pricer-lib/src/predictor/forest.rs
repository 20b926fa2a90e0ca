//! Bagged regression forest
//!
//! Trains each tree on a bootstrap sample (random draw with replacement)
//! of the full training table and predicts the mean across trees. Mixed
//! categorical codes and raw millimetre measurements feed in unscaled;
//! tree splits are insensitive to feature scale.

use super::tree::RegressionTree;
use crate::error::{PricerError, Result};
use crate::models::NUM_FEATURES;
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Ensemble regressor over bootstrap-sampled CART trees.
///
/// Fully deterministic for a given seed: tree `i` draws its sample from
/// `StdRng` seeded with `seed + i`, so refitting the same table
/// reproduces the same forest.
#[derive(Debug, Clone)]
pub struct RandomForestRegressor {
    trees: Vec<RegressionTree>,
    n_estimators: usize,
    max_depth: usize,
    seed: u64,
}

impl RandomForestRegressor {
    pub fn new(n_estimators: usize, max_depth: usize, seed: u64) -> Self {
        Self {
            trees: Vec::new(),
            n_estimators,
            max_depth,
            seed,
        }
    }

    /// Fits the forest on the full table.
    ///
    /// # Errors
    ///
    /// Fails on an empty table or mismatched row/target lengths; both are
    /// startup-fatal for the service.
    pub fn fit(&mut self, rows: &[[f64; NUM_FEATURES]], targets: &[f64]) -> Result<()> {
        if rows.len() != targets.len() {
            return Err(PricerError::Training(format!(
                "feature rows ({}) and price labels ({}) differ in length",
                rows.len(),
                targets.len()
            )));
        }
        if rows.is_empty() {
            return Err(PricerError::Training(
                "cannot fit on an empty training table".to_string(),
            ));
        }

        self.trees = Vec::with_capacity(self.n_estimators);
        for i in 0..self.n_estimators {
            let indices = bootstrap_sample(rows.len(), self.seed + i as u64);
            self.trees
                .push(RegressionTree::fit(rows, targets, &indices, self.max_depth));
        }
        Ok(())
    }

    /// Mean prediction across all trees.
    ///
    /// # Panics
    ///
    /// Panics if called before `fit`; an unfitted forest is a programming
    /// error, not a request-time condition.
    pub fn predict(&self, row: &[f64; NUM_FEATURES]) -> f64 {
        assert!(
            !self.trees.is_empty(),
            "cannot predict with an unfitted forest; call fit() first"
        );
        let sum: f64 = self.trees.iter().map(|tree| tree.predict(row)).sum();
        sum / self.trees.len() as f64
    }

    pub fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }

    pub fn n_estimators(&self) -> usize {
        self.n_estimators
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

/// Indices of a bootstrap sample: `n_samples` draws with replacement.
fn bootstrap_sample(n_samples: usize, seed: u64) -> Vec<usize> {
    let dist = Uniform::from(0..n_samples);
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n_samples).map(|_| dist.sample(&mut rng)).collect()
}
