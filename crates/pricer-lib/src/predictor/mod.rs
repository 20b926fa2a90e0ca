//! Price prediction engine

mod evaluation;
mod features;
mod forest;
mod tree;

pub use evaluation::{evaluate, mae, mape, mse, r_squared, rmse};
pub use features::{FeatureVectorBuilder, RawDiamond};
pub use forest::RandomForestRegressor;

/// Default forest hyperparameters
pub const DEFAULT_N_TREES: usize = 200;
pub const DEFAULT_MAX_DEPTH: usize = 10;
pub const DEFAULT_SEED: u64 = 42;
