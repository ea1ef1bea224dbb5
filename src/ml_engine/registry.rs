//! Startup loading of every model the service serves.
//!
//! Saved artifacts in the model directory win. When they are absent the
//! models are fitted on the full training CSV instead, so a fresh checkout
//! serves requests without running `agrifusion train` first.

use std::sync::Arc;
use tracing::{info, warn};

use super::storage::ModelStore;
use super::training::{train_crop_file, train_fertilizer_file, FertilizerArtifacts};
use super::{Classifier, LabelEncoder, ModelError};
use crate::config::DataConfig;

/// Fertilizer classifier with the encoders for its categorical inputs.
#[derive(Clone)]
pub struct FertilizerModel {
    pub classifier: Arc<dyn Classifier>,
    pub soil_encoder: LabelEncoder,
    pub crop_encoder: LabelEncoder,
}

impl From<FertilizerArtifacts> for FertilizerModel {
    fn from(a: FertilizerArtifacts) -> Self {
        Self {
            classifier: Arc::new(a.classifier),
            soil_encoder: a.soil_encoder,
            crop_encoder: a.crop_encoder,
        }
    }
}

impl std::fmt::Debug for FertilizerModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FertilizerModel")
            .field("classes", &self.classifier.classes().len())
            .field("soils", &self.soil_encoder.classes())
            .field("crops", &self.crop_encoder.classes())
            .finish()
    }
}

/// All loaded models. Immutable after construction.
#[derive(Clone)]
pub struct ModelRegistry {
    pub fertilizer: Arc<FertilizerModel>,
    /// Absent when neither a saved crop model nor crop training data exists
    pub crop: Option<Arc<dyn Classifier>>,
}

impl ModelRegistry {
    pub fn new(fertilizer: FertilizerModel, crop: Option<Arc<dyn Classifier>>) -> Self {
        Self {
            fertilizer: Arc::new(fertilizer),
            crop,
        }
    }

    /// Load saved artifacts from `data.model_dir`, falling back to training.
    ///
    /// A fertilizer model is required; the crop model is optional and any
    /// failure to obtain it is logged and tolerated.
    pub fn load(data: &DataConfig) -> Result<Self, ModelError> {
        let store = ModelStore::new(&data.model_dir);

        let fertilizer = match store.load_fertilizer()? {
            Some(artifacts) => {
                info!(dir = %store.dir().display(), "Loaded saved fertilizer model");
                artifacts
            }
            None => {
                warn!(
                    dir = %store.dir().display(),
                    training = %data.fertilizer_training.display(),
                    "No saved fertilizer model, fitting from training data"
                );
                train_fertilizer_file(&data.fertilizer_training, 0.0, 0)?.0
            }
        };

        let crop = match Self::load_crop(&store, data) {
            Ok(model) => model,
            Err(e) => {
                warn!(error = %e, "Crop model unavailable, /predict will return errors");
                None
            }
        };

        Ok(Self::new(fertilizer.into(), crop))
    }

    fn load_crop(
        store: &ModelStore,
        data: &DataConfig,
    ) -> Result<Option<Arc<dyn Classifier>>, ModelError> {
        if let Some(model) = store.load_crop()? {
            info!(dir = %store.dir().display(), "Loaded saved crop model");
            return Ok(Some(Arc::new(model)));
        }
        if !data.crop_training.is_file() {
            warn!(
                training = %data.crop_training.display(),
                "No saved crop model and no crop training data"
            );
            return Ok(None);
        }
        let (model, _) = train_crop_file(&data.crop_training, 0.0, 0)?;
        Ok(Some(Arc::new(model)))
    }
}
