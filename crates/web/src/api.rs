//! HTTP surface: the prediction form, health probes, Prometheus metrics

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{get, post},
    Form, Json, Router,
};
use pricer_lib::{
    format_usd, HealthRegistry, PredictionService, PricerMetrics, ServicePhase,
    TrainingFitMetrics,
};
use prometheus::{Encoder, TextEncoder};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use tracing::info;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub health_registry: HealthRegistry,
    pub metrics: PricerMetrics,
    service: Arc<OnceLock<Arc<PredictionService>>>,
}

impl AppState {
    pub fn new(health_registry: HealthRegistry, metrics: PricerMetrics) -> Self {
        Self {
            health_registry,
            metrics,
            service: Arc::new(OnceLock::new()),
        }
    }

    /// Installs the fitted service; called exactly once when training
    /// finishes.
    pub fn install_service(&self, service: Arc<PredictionService>) {
        assert!(
            self.service.set(service).is_ok(),
            "prediction service installed twice"
        );
    }

    pub fn service(&self) -> Option<&Arc<PredictionService>> {
        self.service.get()
    }
}

/// Form page; shows the metrics section once the model is fitted
async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    let metrics = state.service().map(|s| s.training_fit_metrics().clone());
    Html(render_page(None, metrics.as_ref()))
}

/// Form submission; always answers with a renderable page
async fn predict(
    State(state): State<Arc<AppState>>,
    Form(fields): Form<HashMap<String, String>>,
) -> impl IntoResponse {
    let Some(service) = state.service() else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Html(render_page(
                Some("Error: the pricing model is still warming up, try again shortly"),
                None,
            )),
        );
    };

    let outcome = match service.handle_prediction_request(&fields) {
        Ok(text) => text,
        Err(text) => text,
    };
    (
        StatusCode::OK,
        Html(render_page(
            Some(&outcome),
            Some(service.training_fit_metrics()),
        )),
    )
}

/// Liveness probe - 200 unless startup failed
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_registry.health().await;

    let status_code = match health.phase {
        ServicePhase::Starting | ServicePhase::Ready => StatusCode::OK,
        ServicePhase::Failed => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

/// Readiness probe - 200 only once the model is fitted
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

/// Prometheus metrics endpoint
async fn metrics_endpoint() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    encoder.encode(&metric_families, &mut buffer).unwrap();

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/predict", post(predict))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
}

/// Start the API server
pub async fn serve(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Renders the single-page UI: the input form, the latest outcome text,
/// and the training-fit metrics section.
fn render_page(outcome: Option<&str>, metrics: Option<&TrainingFitMetrics>) -> String {
    let mut page = String::with_capacity(4096);
    page.push_str(
        "<!DOCTYPE html>\n\
         <html>\n<head><title>Diamond Price Predictor</title></head>\n<body>\n\
         <h1>Diamond Price Predictor</h1>\n\
         <form action=\"/predict\" method=\"post\">\n",
    );

    for (name, label, placeholder) in [
        ("carat", "Carat", "e.g. 1.0"),
        ("cut", "Cut", "Fair / Good / Very Good / Premium / Ideal"),
        ("color", "Color", "D - J"),
        ("clarity", "Clarity", "e.g. VS1"),
        ("depth", "Depth %", "e.g. 61.5"),
        ("table", "Table %", "e.g. 55"),
        ("x", "Length x (mm)", "e.g. 6.4"),
        ("y", "Width y (mm)", "e.g. 6.4"),
        ("z", "Depth z (mm)", "e.g. 4.0"),
    ] {
        page.push_str(&format!(
            "  <label for=\"{name}\">{label}</label>\n  \
             <input type=\"text\" id=\"{name}\" name=\"{name}\" placeholder=\"{placeholder}\"><br>\n"
        ));
    }
    page.push_str("  <button type=\"submit\">Estimate price</button>\n</form>\n");

    if let Some(text) = outcome {
        page.push_str(&format!(
            "<p class=\"outcome\">{}</p>\n",
            escape_html(text)
        ));
    }

    match metrics {
        Some(m) => {
            page.push_str(&format!(
                "<h2>About the model</h2>\n\
                 <p>Accuracy measured on the {} training rows the model was \
                 fitted on (in-sample, optimistic for unseen diamonds):</p>\n\
                 <ul>\n\
                 <li>MSE: {:.2}</li>\n\
                 <li>RMSE: {}</li>\n\
                 <li>MAE: {}</li>\n\
                 <li>R&sup2;: {:.4}</li>\n\
                 <li>MAPE: {:.2}%</li>\n\
                 </ul>\n",
                m.n_samples,
                m.mse,
                format_usd(m.rmse),
                format_usd(m.mae),
                m.r2,
                m.mape_percent,
            ));
        }
        None => {
            page.push_str("<p>The pricing model is still warming up.</p>\n");
        }
    }

    page.push_str("</body>\n</html>\n");
    page
}

/// Minimal escaping for text interpolated into the page; outcome strings
/// echo request input back to the browser.
fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_page_contains_all_form_fields() {
        let page = render_page(None, None);
        for name in ["carat", "cut", "color", "clarity", "depth", "table", "x", "y", "z"] {
            assert!(page.contains(&format!("name=\"{name}\"")), "missing {name}");
        }
        assert!(page.contains("warming up"));
    }

    #[test]
    fn test_render_page_shows_outcome_and_metrics() {
        let metrics = TrainingFitMetrics {
            mse: 250000.0,
            rmse: 500.0,
            mae: 320.0,
            r2: 0.97,
            mape_percent: 8.5,
            n_samples: 53940,
            computed_at: 0,
        };
        let page = render_page(Some("Predicted Diamond Price: $4,512.34"), Some(&metrics));

        assert!(page.contains("Predicted Diamond Price: $4,512.34"));
        assert!(page.contains("53940 training rows"));
        assert!(page.contains("$500.00"));
        assert!(page.contains("0.9700"));
    }

    #[test]
    fn test_outcome_text_is_escaped() {
        let page = render_page(Some("Error: field '<script>' must be a number"), None);
        assert!(!page.contains("<script>"));
        assert!(page.contains("&lt;script&gt;"));
    }
}
