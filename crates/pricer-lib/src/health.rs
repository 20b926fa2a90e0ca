//! Health and readiness tracking
//!
//! The model is fitted exactly once at process start. Requests that
//! arrive before the fit completes are answered through the readiness
//! gate here instead of reaching an unfitted model.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Lifecycle phase of the prediction service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServicePhase {
    /// Training table loading and model fitting in progress
    Starting,
    /// Model fitted and metrics computed; terminal for a healthy process
    Ready,
    /// Startup failed; the process is on its way down
    Failed,
}

/// Liveness probe payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub phase: ServicePhase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub since_timestamp: i64,
}

/// Readiness probe payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug)]
struct PhaseRecord {
    phase: ServicePhase,
    message: Option<String>,
    since_timestamp: i64,
}

/// Tracks the one-shot startup transition and answers probe requests.
#[derive(Debug, Clone)]
pub struct HealthRegistry {
    inner: Arc<RwLock<PhaseRecord>>,
}

impl Default for HealthRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthRegistry {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(PhaseRecord {
                phase: ServicePhase::Starting,
                message: None,
                since_timestamp: chrono::Utc::now().timestamp(),
            })),
        }
    }

    /// Marks the one-time Starting → Ready transition.
    pub async fn set_ready(&self) {
        let mut record = self.inner.write().await;
        record.phase = ServicePhase::Ready;
        record.message = None;
        record.since_timestamp = chrono::Utc::now().timestamp();
    }

    /// Records a fatal startup failure.
    pub async fn set_failed(&self, message: impl Into<String>) {
        let mut record = self.inner.write().await;
        record.phase = ServicePhase::Failed;
        record.message = Some(message.into());
        record.since_timestamp = chrono::Utc::now().timestamp();
    }

    pub async fn phase(&self) -> ServicePhase {
        self.inner.read().await.phase
    }

    pub async fn health(&self) -> HealthResponse {
        let record = self.inner.read().await;
        HealthResponse {
            phase: record.phase,
            message: record.message.clone(),
            since_timestamp: record.since_timestamp,
        }
    }

    pub async fn readiness(&self) -> ReadinessResponse {
        let record = self.inner.read().await;
        match record.phase {
            ServicePhase::Ready => ReadinessResponse {
                ready: true,
                reason: None,
            },
            ServicePhase::Starting => ReadinessResponse {
                ready: false,
                reason: Some("model not fitted yet".to_string()),
            },
            ServicePhase::Failed => ReadinessResponse {
                ready: false,
                reason: Some(
                    record
                        .message
                        .clone()
                        .unwrap_or_else(|| "startup failed".to_string()),
                ),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_registry_starts_in_starting_phase() {
        let registry = HealthRegistry::new();
        assert_eq!(registry.phase().await, ServicePhase::Starting);

        let readiness = registry.readiness().await;
        assert!(!readiness.ready);
        assert_eq!(readiness.reason.as_deref(), Some("model not fitted yet"));
    }

    #[tokio::test]
    async fn test_ready_after_transition() {
        let registry = HealthRegistry::new();
        registry.set_ready().await;

        assert_eq!(registry.phase().await, ServicePhase::Ready);
        let readiness = registry.readiness().await;
        assert!(readiness.ready);
        assert!(readiness.reason.is_none());
    }

    #[tokio::test]
    async fn test_failed_startup_reports_the_reason() {
        let registry = HealthRegistry::new();
        registry.set_failed("dataset error: missing file").await;

        let readiness = registry.readiness().await;
        assert!(!readiness.ready);
        assert_eq!(
            readiness.reason.as_deref(),
            Some("dataset error: missing file")
        );

        let health = registry.health().await;
        assert_eq!(health.phase, ServicePhase::Failed);
        assert!(health.message.is_some());
    }

    #[tokio::test]
    async fn test_clones_share_the_same_record() {
        let registry = HealthRegistry::new();
        let clone = registry.clone();
        registry.set_ready().await;

        assert_eq!(clone.phase().await, ServicePhase::Ready);
    }
}
