//! AgriFusion: crop and fertilizer recommendation services
//!
//! ## Architecture
//!
//! - **Reference data**: per-hectare fertilizer dosage table loaded from CSV
//! - **ML Engine**: label encoders and nearest-centroid classifiers, trained
//!   offline or at startup
//! - **Resolver**: encodes a request, predicts a fertilizer, scales every
//!   matching dosage row to the land area and picks a primary option
//! - **API**: axum HTTP surface over the resolver and the crop model

pub mod api;
pub mod config;
pub mod ml_engine;
pub mod reference;
pub mod resolver;
pub mod types;

// Re-export configuration
pub use config::{ConfigError, ServiceConfig};

// Re-export commonly used types
pub use types::{
    CropFeatures, CropPrediction, DoseTableRow, FertilizerOption, FertilizerRequest, LandUnit,
    Recommendation, RecommendationResult,
};

// Re-export ML Engine types
pub use ml_engine::{Classifier, ModelError, ModelRegistry, ModelStore};

pub use reference::{DoseTable, ReferenceError};
pub use resolver::{FertilizerResolver, ResolveError};
