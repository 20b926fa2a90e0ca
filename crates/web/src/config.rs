//! Service configuration

use anyhow::Result;
use pricer_lib::TrainingOptions;
use serde::Deserialize;

/// Web service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PricerConfig {
    /// HTTP port for the form and health/metrics endpoints
    #[serde(default = "default_bind_port")]
    pub bind_port: u16,

    /// Path to the training table CSV
    #[serde(default = "default_dataset_path")]
    pub dataset_path: String,

    /// Number of trees in the forest
    #[serde(default = "default_n_trees")]
    pub n_trees: usize,

    /// Maximum depth of each tree
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Seed for the bootstrap sampler
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_bind_port() -> u16 {
    8080
}

fn default_dataset_path() -> String {
    "data/diamonds.csv".to_string()
}

fn default_n_trees() -> usize {
    200
}

fn default_max_depth() -> usize {
    10
}

fn default_seed() -> u64 {
    42
}

impl PricerConfig {
    /// Loads configuration from `PRICER_`-prefixed environment variables.
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("PRICER"))
            .build()?;

        Ok(config.try_deserialize().unwrap_or_else(|_| PricerConfig {
            bind_port: default_bind_port(),
            dataset_path: default_dataset_path(),
            n_trees: default_n_trees(),
            max_depth: default_max_depth(),
            seed: default_seed(),
        }))
    }

    pub fn training_options(&self) -> TrainingOptions {
        TrainingOptions {
            n_trees: self.n_trees,
            max_depth: self.max_depth,
            seed: self.seed,
        }
    }
}
