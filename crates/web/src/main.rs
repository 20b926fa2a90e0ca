//! Diamond price prediction service
//!
//! Fits the pricing model once at startup, then serves the prediction
//! form, health probes, and Prometheus metrics over HTTP.

use anyhow::{Context, Result};
use pricer_lib::{HealthRegistry, PredictionService, PricerMetrics, TrainingTable};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod api;
mod config;

const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!(version = SERVICE_VERSION, "Starting diamond-pricer");

    let config = config::PricerConfig::load()?;
    info!(
        dataset = %config.dataset_path,
        port = config.bind_port,
        n_trees = config.n_trees,
        max_depth = config.max_depth,
        "Service configured"
    );

    let health_registry = HealthRegistry::new();
    let metrics = PricerMetrics::new();
    let app_state = Arc::new(api::AppState::new(health_registry.clone(), metrics));

    // Serve immediately; the readiness gate answers 503 until the model
    // is fitted.
    let api_handle = tokio::spawn(api::serve(config.bind_port, app_state.clone()));

    let dataset_path = config.dataset_path.clone();
    let options = config.training_options();
    let fitted = tokio::task::spawn_blocking(move || {
        let table = TrainingTable::load(&dataset_path)?;
        PredictionService::fit(&table, &options)
    })
    .await
    .context("training task panicked")?;

    match fitted {
        Ok(service) => {
            app_state.install_service(Arc::new(service));
            health_registry.set_ready().await;
            info!(event = "service_ready", "Model fitted, accepting prediction requests");
        }
        Err(err) => {
            error!(event = "startup_failed", error = %err, "Aborting startup");
            health_registry.set_failed(err.to_string()).await;
            return Err(anyhow::Error::new(err).context("startup training failed"));
        }
    }

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    info!(event = "service_shutdown", reason = "SIGINT received", "Shutting down");
    api_handle.abort();

    Ok(())
}
