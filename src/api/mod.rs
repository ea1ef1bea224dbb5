//! REST API module using Axum
//!
//! Serves the fertilizer resolver and the crop recommendation model over
//! HTTP. All handler state is immutable after startup.

pub mod error;
pub mod handlers;
mod routes;

pub use error::ApiError;
pub use handlers::ServiceState;

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the CORS layer.
///
/// With no configured origins every origin is allowed, which is what
/// browser frontends served from another port expect.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    if origins.is_empty() {
        return base.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| o.trim().parse().ok())
        .collect();
    tracing::info!(origins = ?origins, "CORS: allowing configured origins");
    base.allow_origin(allowed)
}

/// Create the complete application router.
pub fn create_app(state: ServiceState, cors_origins: &[String]) -> Router {
    routes::service_routes(state)
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(cors_origins))
}
