//! Service liveness endpoints: banner and health

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::ServiceState;

/// GET / - Plain-text banner
pub async fn index() -> &'static str {
    "AgriFusion ML API running"
}

/// Per-model load summary
#[derive(Debug, Serialize)]
pub struct ModelSummary {
    pub loaded: bool,
    /// Number of labels the model can predict
    pub classes: usize,
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub started_at: DateTime<Utc>,
    pub uptime_seconds: i64,
    pub fertilizer_model: ModelSummary,
    pub crop_model: ModelSummary,
    /// Rows in the dosage reference table
    pub dose_table_rows: usize,
    /// Distinct crops in the dosage reference table
    pub dose_table_crops: usize,
}

/// GET /health - Service health and loaded-data summary
pub async fn health_check(State(state): State<ServiceState>) -> Json<HealthResponse> {
    let table = state.resolver.dose_table();
    let crop_classes = state.crop_model.as_ref().map_or(0, |m| m.classes().len());

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        started_at: state.started_at,
        uptime_seconds: (Utc::now() - state.started_at).num_seconds(),
        fertilizer_model: ModelSummary {
            loaded: true,
            classes: state.resolver.model().classifier.classes().len(),
        },
        crop_model: ModelSummary {
            loaded: state.crop_model.is_some(),
            classes: crop_classes,
        },
        dose_table_rows: table.len(),
        dose_table_crops: table.known_crops().len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::handlers::test_support;

    #[tokio::test]
    async fn test_health_check() {
        let Json(resp) = health_check(State(test_support::state(true))).await;
        assert_eq!(resp.status, "healthy");
        assert!(resp.uptime_seconds >= 0);
        assert_eq!(resp.fertilizer_model.classes, 3);
        assert!(resp.crop_model.loaded);
        assert_eq!(resp.crop_model.classes, 2);
        assert_eq!(resp.dose_table_rows, 4);
        assert_eq!(resp.dose_table_crops, 3);
    }

    #[tokio::test]
    async fn test_health_without_crop_model() {
        let Json(resp) = health_check(State(test_support::state(false))).await;
        assert!(!resp.crop_model.loaded);
        assert_eq!(resp.crop_model.classes, 0);
    }

    #[tokio::test]
    async fn test_index_banner() {
        assert_eq!(index().await, "AgriFusion ML API running");
    }
}
