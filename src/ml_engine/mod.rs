//! ML Engine for crop and fertilizer recommendation
//!
//! Models are trained offline (or at startup when no artifacts exist) and
//! are read-only afterwards.
//!
//! ## Architecture
//! - `encoder`: label encoding of categorical features (soil, crop)
//! - `classifier`: the `Classifier` trait and a standardized nearest-centroid model
//! - `dataset`: CSV training data loaders and seeded train/test split
//! - `training`: fit + held-out accuracy report
//! - `storage`: JSON model artifacts
//! - `registry`: startup loading of every served model

pub mod classifier;
pub mod dataset;
pub mod encoder;
mod error;
pub mod registry;
pub mod storage;
pub mod training;

pub use classifier::{Classifier, NearestCentroidClassifier};
pub use encoder::LabelEncoder;
pub use error::ModelError;
pub use registry::{FertilizerModel, ModelRegistry};
pub use storage::ModelStore;
pub use training::{FertilizerArtifacts, TrainingReport};
