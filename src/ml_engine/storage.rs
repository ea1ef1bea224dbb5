//! Model artifact persistence.
//!
//! Artifacts are JSON files in one directory:
//!
//! | File                    | Contents                         |
//! |-------------------------|----------------------------------|
//! | `fertilizer_model.json` | fertilizer nearest-centroid model |
//! | `soil_encoder.json`     | soil type label encoder          |
//! | `crop_encoder.json`     | crop type label encoder          |
//! | `crop_model.json`       | crop nearest-centroid model      |

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

use super::dataset::{CROP_FEATURES, FERTILIZER_FEATURES};
use super::training::FertilizerArtifacts;
use super::{Classifier, ModelError, NearestCentroidClassifier};

pub const FERTILIZER_MODEL_FILE: &str = "fertilizer_model.json";
pub const SOIL_ENCODER_FILE: &str = "soil_encoder.json";
pub const CROP_ENCODER_FILE: &str = "crop_encoder.json";
pub const CROP_MODEL_FILE: &str = "crop_model.json";

/// Reads and writes model artifacts under one directory.
#[derive(Debug, Clone)]
pub struct ModelStore {
    dir: PathBuf,
}

impl ModelStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    fn write_json<T: Serialize>(&self, file: &str, value: &T) -> Result<(), ModelError> {
        let path = self.path(file);
        let json = serde_json::to_string_pretty(value)
            .map_err(|e| ModelError::Serialization(path.clone(), e))?;
        std::fs::write(&path, json).map_err(|e| ModelError::Io(path, e))
    }

    fn read_json<T: DeserializeOwned>(&self, file: &str) -> Result<T, ModelError> {
        let path = self.path(file);
        let text = std::fs::read_to_string(&path).map_err(|e| ModelError::Io(path.clone(), e))?;
        serde_json::from_str(&text).map_err(|e| ModelError::Serialization(path, e))
    }

    fn invalid(&self, file: &str, reason: String) -> ModelError {
        ModelError::InvalidArtifact(self.path(file), reason)
    }

    fn has_all(&self, files: &[&str]) -> bool {
        files.iter().all(|f| self.path(f).is_file())
    }

    /// Write the fertilizer model and both encoders, creating the directory.
    pub fn save_fertilizer(&self, artifacts: &FertilizerArtifacts) -> Result<(), ModelError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| ModelError::Io(self.dir.clone(), e))?;
        self.write_json(FERTILIZER_MODEL_FILE, &artifacts.classifier)?;
        self.write_json(SOIL_ENCODER_FILE, &artifacts.soil_encoder)?;
        self.write_json(CROP_ENCODER_FILE, &artifacts.crop_encoder)?;
        info!(dir = %self.dir.display(), "Fertilizer model and encoders saved");
        Ok(())
    }

    /// Load the fertilizer artifacts. `Ok(None)` when any file is absent.
    pub fn load_fertilizer(&self) -> Result<Option<FertilizerArtifacts>, ModelError> {
        if !self.has_all(&[FERTILIZER_MODEL_FILE, SOIL_ENCODER_FILE, CROP_ENCODER_FILE]) {
            return Ok(None);
        }
        let artifacts = FertilizerArtifacts {
            classifier: self.read_json(FERTILIZER_MODEL_FILE)?,
            soil_encoder: self.read_json(SOIL_ENCODER_FILE)?,
            crop_encoder: self.read_json(CROP_ENCODER_FILE)?,
        };
        self.check_classifier(
            FERTILIZER_MODEL_FILE,
            &artifacts.classifier,
            FERTILIZER_FEATURES.len(),
        )?;
        artifacts
            .soil_encoder
            .check()
            .map_err(|r| self.invalid(SOIL_ENCODER_FILE, r))?;
        artifacts
            .crop_encoder
            .check()
            .map_err(|r| self.invalid(CROP_ENCODER_FILE, r))?;
        Ok(Some(artifacts))
    }

    fn check_classifier(
        &self,
        file: &str,
        model: &NearestCentroidClassifier,
        features: usize,
    ) -> Result<(), ModelError> {
        model.check().map_err(|r| self.invalid(file, r))?;
        let got = model.feature_names().len();
        if got != features {
            return Err(self.invalid(file, format!("expected {features} features, found {got}")));
        }
        Ok(())
    }

    pub fn save_crop(&self, model: &NearestCentroidClassifier) -> Result<(), ModelError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| ModelError::Io(self.dir.clone(), e))?;
        self.write_json(CROP_MODEL_FILE, model)?;
        info!(dir = %self.dir.display(), "Crop model saved");
        Ok(())
    }

    /// Load the crop model. `Ok(None)` when the file is absent.
    pub fn load_crop(&self) -> Result<Option<NearestCentroidClassifier>, ModelError> {
        if !self.has_all(&[CROP_MODEL_FILE]) {
            return Ok(None);
        }
        let model: NearestCentroidClassifier = self.read_json(CROP_MODEL_FILE)?;
        self.check_classifier(CROP_MODEL_FILE, &model, CROP_FEATURES.len())?;
        Ok(Some(model))
    }
}
