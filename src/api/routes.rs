//! API route definitions
//!
//! - `/` - banner
//! - `/health` - service health
//! - `/get_fertilizer` - fertilizer recommendation
//! - `/predict` - crop recommendation

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{self, ServiceState};

/// Create all service routes
pub fn service_routes(state: ServiceState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health_check))
        .route("/get_fertilizer", get(handlers::get_fertilizer))
        .route("/predict", post(handlers::predict_crop))
        .with_state(state)
}
