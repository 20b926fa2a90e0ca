//! CART regression tree
//!
//! Splits greedily on the feature/threshold pair with the largest variance
//! reduction; leaves predict the mean of their targets. Works on index
//! subsets of the caller's rows so bootstrap samples never get copied.

use crate::models::NUM_FEATURES;

/// Minimum samples a node needs before a split is attempted
const MIN_SAMPLES_SPLIT: usize = 2;

/// Variance below which a node is considered pure
const PURITY_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
    Leaf {
        value: f64,
    },
}

#[derive(Debug, Clone)]
pub struct RegressionTree {
    root: Node,
}

impl RegressionTree {
    /// Builds a tree over the rows selected by `indices` (duplicates
    /// allowed, so a bootstrap sample is just a list of indices).
    pub fn fit(
        rows: &[[f64; NUM_FEATURES]],
        targets: &[f64],
        indices: &[usize],
        max_depth: usize,
    ) -> Self {
        Self {
            root: build_node(rows, targets, indices, 0, max_depth),
        }
    }

    pub fn predict(&self, row: &[f64; NUM_FEATURES]) -> f64 {
        let mut node = &self.root;
        loop {
            match node {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold { left } else { right };
                }
            }
        }
    }
}

fn build_node(
    rows: &[[f64; NUM_FEATURES]],
    targets: &[f64],
    indices: &[usize],
    depth: usize,
    max_depth: usize,
) -> Node {
    let ys: Vec<f64> = indices.iter().map(|&i| targets[i]).collect();

    if indices.len() < MIN_SAMPLES_SPLIT || depth >= max_depth || variance(&ys) < PURITY_EPSILON {
        return Node::Leaf { value: mean(&ys) };
    }

    let Some((feature, threshold)) = best_split(rows, targets, indices) else {
        return Node::Leaf { value: mean(&ys) };
    };

    let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
        .iter()
        .copied()
        .partition(|&i| rows[i][feature] <= threshold);

    if left_indices.is_empty() || right_indices.is_empty() {
        return Node::Leaf { value: mean(&ys) };
    }

    Node::Split {
        feature,
        threshold,
        left: Box::new(build_node(rows, targets, &left_indices, depth + 1, max_depth)),
        right: Box::new(build_node(
            rows,
            targets,
            &right_indices,
            depth + 1,
            max_depth,
        )),
    }
}

/// Finds the split with the largest variance reduction, trying midpoints
/// between consecutive distinct values of every feature.
fn best_split(
    rows: &[[f64; NUM_FEATURES]],
    targets: &[f64],
    indices: &[usize],
) -> Option<(usize, f64)> {
    let ys: Vec<f64> = indices.iter().map(|&i| targets[i]).collect();
    let parent_variance = variance(&ys);

    let mut best_gain = 0.0;
    let mut best: Option<(usize, f64)> = None;

    for feature in 0..NUM_FEATURES {
        let mut values: Vec<f64> = indices.iter().map(|&i| rows[i][feature]).collect();
        values.sort_by(f64::total_cmp);
        values.dedup_by(|a, b| (*a - *b).abs() < PURITY_EPSILON);

        for pair in values.windows(2) {
            let threshold = (pair[0] + pair[1]) / 2.0;

            let mut left = Vec::new();
            let mut right = Vec::new();
            for &i in indices {
                if rows[i][feature] <= threshold {
                    left.push(targets[i]);
                } else {
                    right.push(targets[i]);
                }
            }
            if left.is_empty() || right.is_empty() {
                continue;
            }

            let split_variance = (left.len() as f64 * variance(&left)
                + right.len() as f64 * variance(&right))
                / indices.len() as f64;
            let gain = parent_variance - split_variance;

            if gain > best_gain {
                best_gain = gain;
                best = Some((feature, threshold));
            }
        }
    }

    best
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population variance; the split criterion only ever compares variances,
/// so the n vs n-1 denominator choice cancels out.
fn variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(carat: f64) -> [f64; NUM_FEATURES] {
        [carat, 0.0, 0.0, 0.0, 61.0, 55.0, 4.0, 4.0, 2.5]
    }

    fn all_indices(n: usize) -> Vec<usize> {
        (0..n).collect()
    }

    #[test]
    fn test_constant_targets_yield_single_leaf() {
        let rows: Vec<_> = (0..6).map(|i| row(i as f64)).collect();
        let targets = vec![500.0; 6];
        let tree = RegressionTree::fit(&rows, &targets, &all_indices(6), 8);

        assert!((tree.predict(&row(2.5)) - 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_depth_predicts_the_mean() {
        let rows: Vec<_> = (0..4).map(|i| row(i as f64)).collect();
        let targets = vec![100.0, 200.0, 300.0, 400.0];
        let tree = RegressionTree::fit(&rows, &targets, &all_indices(4), 0);

        assert!((tree.predict(&row(0.0)) - 250.0).abs() < 1e-9);
    }

    #[test]
    fn test_splits_separate_cheap_from_expensive() {
        let rows: Vec<_> = [0.3, 0.4, 0.5, 2.0, 2.1, 2.2].map(row).to_vec();
        let targets = vec![400.0, 420.0, 440.0, 15000.0, 15500.0, 16000.0];
        let tree = RegressionTree::fit(&rows, &targets, &all_indices(6), 8);

        assert!(tree.predict(&row(0.35)) < 1000.0);
        assert!(tree.predict(&row(2.05)) > 10000.0);
    }

    #[test]
    fn test_prediction_stays_within_target_range() {
        let rows: Vec<_> = (0..10).map(|i| row(0.2 + 0.3 * i as f64)).collect();
        let targets: Vec<f64> = (0..10).map(|i| 300.0 + 1700.0 * i as f64).collect();
        let tree = RegressionTree::fit(&rows, &targets, &all_indices(10), 10);

        for carat in [0.0, 0.5, 1.7, 5.0] {
            let predicted = tree.predict(&row(carat));
            assert!((300.0..=15600.0).contains(&predicted), "got {predicted}");
        }
    }

    #[test]
    fn test_fit_on_duplicate_indices() {
        let rows: Vec<_> = [0.3, 2.0].map(row).to_vec();
        let targets = vec![400.0, 15000.0];
        // bootstrap-style index list with repetition
        let tree = RegressionTree::fit(&rows, &targets, &[0, 0, 1, 1, 0], 4);

        assert!(tree.predict(&row(0.3)) < tree.predict(&row(2.0)));
    }

    #[test]
    fn test_variance_of_constant_is_zero() {
        assert_eq!(variance(&[7.0, 7.0, 7.0]), 0.0);
        assert_eq!(variance(&[]), 0.0);
    }
}
