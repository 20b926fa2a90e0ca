//! Core library for the diamond price prediction service
//!
//! This crate provides:
//! - Training-table loading from CSV
//! - Categorical grade encoding with silent fallback
//! - Random-forest price regression
//! - Training-fit metric evaluation
//! - Request orchestration, health tracking, and observability

pub mod dataset;
pub mod encoding;
pub mod error;
pub mod health;
pub mod models;
pub mod observability;
pub mod predictor;
pub mod service;

pub use dataset::TrainingTable;
pub use encoding::CategoryEncoder;
pub use error::PricerError;
pub use health::{HealthRegistry, HealthResponse, ReadinessResponse, ServicePhase};
pub use models::*;
pub use observability::PricerMetrics;
pub use service::{format_usd, PredictionService, TrainingOptions};
