//! API route handlers
//!
//! - `fertilizer`: `GET /get_fertilizer`
//! - `crop`: `POST /predict`
//! - `status`: `GET /` and `GET /health`

mod crop;
mod fertilizer;
mod status;

pub use crop::*;
pub use fertilizer::*;
pub use status::*;

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::config::DefaultsConfig;
use crate::ml_engine::{Classifier, ModelRegistry};
use crate::reference::DoseTable;
use crate::resolver::FertilizerResolver;

// ============================================================================
// API State
// ============================================================================

/// Shared, read-only state for API handlers.
#[derive(Clone)]
pub struct ServiceState {
    pub resolver: FertilizerResolver,
    /// `None` when no crop model could be loaded or trained
    pub crop_model: Option<Arc<dyn Classifier>>,
    /// Fallbacks for omitted fertilizer query parameters
    pub defaults: Arc<DefaultsConfig>,
    pub started_at: DateTime<Utc>,
}

impl ServiceState {
    pub fn new(registry: ModelRegistry, dose_table: DoseTable, defaults: DefaultsConfig) -> Self {
        Self {
            resolver: FertilizerResolver::new(registry.fertilizer, Arc::new(dose_table)),
            crop_model: registry.crop,
            defaults: Arc::new(defaults),
            started_at: Utc::now(),
        }
    }
}
