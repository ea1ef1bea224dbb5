//! Offline training pipeline: load CSV, encode, split, fit, report.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

use super::dataset::{crop_dataset_from_csv_str, fertilizer_dataset_from_csv_str, Dataset};
use super::{LabelEncoder, ModelError, NearestCentroidClassifier};

/// Outcome of one training run.
#[derive(Debug, Clone, Serialize)]
pub struct TrainingReport {
    pub model: &'static str,
    pub train_samples: usize,
    pub test_samples: usize,
    pub classes: usize,
    /// Held-out accuracy; `None` when nothing was held out
    pub accuracy: Option<f64>,
    /// Held-out precision per class; empty when nothing was held out
    pub per_class_precision: BTreeMap<String, f64>,
}

/// Everything the fertilizer resolver needs from training.
#[derive(Debug, Clone)]
pub struct FertilizerArtifacts {
    pub classifier: NearestCentroidClassifier,
    pub soil_encoder: LabelEncoder,
    pub crop_encoder: LabelEncoder,
}

fn read(path: &Path) -> Result<String, ModelError> {
    std::fs::read_to_string(path).map_err(|e| ModelError::Io(path.to_path_buf(), e))
}

fn fit_and_report(
    model: &'static str,
    data: &Dataset,
    test_fraction: f64,
    seed: u64,
) -> Result<(NearestCentroidClassifier, TrainingReport), ModelError> {
    if data.is_empty() {
        return Err(ModelError::EmptyTrainingSet);
    }
    let (train, test) = data.split(test_fraction, seed);
    let classifier =
        NearestCentroidClassifier::fit(train.feature_names.clone(), &train.samples, &train.labels)?;
    let report = TrainingReport {
        model,
        train_samples: train.len(),
        test_samples: test.len(),
        classes: super::Classifier::classes(&classifier).len(),
        accuracy: classifier.accuracy(&test.samples, &test.labels),
        per_class_precision: classifier.per_class_precision(&test.samples, &test.labels),
    };
    info!(
        model,
        train = report.train_samples,
        test = report.test_samples,
        classes = report.classes,
        accuracy = ?report.accuracy,
        "Model trained"
    );
    for (class, precision) in &report.per_class_precision {
        debug!(model, class = %class, precision, "Held-out precision");
    }
    Ok((classifier, report))
}

/// Train the fertilizer classifier and its encoders from CSV text.
pub fn train_fertilizer(
    text: &str,
    test_fraction: f64,
    seed: u64,
) -> Result<(FertilizerArtifacts, TrainingReport), ModelError> {
    let ds = fertilizer_dataset_from_csv_str(text)?;
    let (classifier, report) = fit_and_report("fertilizer", &ds.data, test_fraction, seed)?;
    Ok((
        FertilizerArtifacts {
            classifier,
            soil_encoder: ds.soil_encoder,
            crop_encoder: ds.crop_encoder,
        },
        report,
    ))
}

/// Train the fertilizer classifier from a CSV file.
pub fn train_fertilizer_file(
    path: &Path,
    test_fraction: f64,
    seed: u64,
) -> Result<(FertilizerArtifacts, TrainingReport), ModelError> {
    train_fertilizer(&read(path)?, test_fraction, seed)
}

/// Train the crop classifier from CSV text.
pub fn train_crop(
    text: &str,
    test_fraction: f64,
    seed: u64,
) -> Result<(NearestCentroidClassifier, TrainingReport), ModelError> {
    let data = crop_dataset_from_csv_str(text)?;
    fit_and_report("crop", &data, test_fraction, seed)
}

/// Train the crop classifier from a CSV file.
pub fn train_crop_file(
    path: &Path,
    test_fraction: f64,
    seed: u64,
) -> Result<(NearestCentroidClassifier, TrainingReport), ModelError> {
    train_crop(&read(path)?, test_fraction, seed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml_engine::Classifier;

    fn fert_csv() -> String {
        let mut s = String::from("Soil Type,Crop Type,Nitrogen,Phosphorus,Potassium,Fertilizer\n");
        for i in 0..10 {
            s.push_str(&format!("Loam,Maize,{},10,10,Urea\n", 80 + i));
            s.push_str(&format!("Clay,Rice,10,{},40,DAP\n", 60 + i));
        }
        s
    }

    #[test]
    fn test_train_fertilizer_reports_split() {
        let (artifacts, report) = train_fertilizer(&fert_csv(), 0.2, 42).unwrap();
        assert_eq!(report.train_samples, 16);
        assert_eq!(report.test_samples, 4);
        assert_eq!(report.accuracy, Some(1.0));
        assert_eq!(report.per_class_precision.len(), 2);
        assert_eq!(report.per_class_precision["DAP"], 1.0);
        assert_eq!(report.per_class_precision["Urea"], 1.0);
        assert_eq!(artifacts.soil_encoder.classes(), &["clay", "loam"]);
        assert_eq!(artifacts.classifier.feature_names().len(), 5);
    }

    #[test]
    fn test_train_without_holdout_uses_every_row() {
        let (_, report) = train_fertilizer(&fert_csv(), 0.0, 42).unwrap();
        assert_eq!(report.train_samples, 20);
        assert_eq!(report.accuracy, None);
        assert!(report.per_class_precision.is_empty());
    }

    #[test]
    fn test_header_only_csv_is_empty_training_set() {
        let err = train_crop("N,P,K,temperature,humidity,ph,label\n", 0.2, 42).unwrap_err();
        assert!(matches!(err, ModelError::EmptyTrainingSet));
    }

    #[test]
    fn test_missing_file() {
        let err = train_crop_file(Path::new("/nonexistent/crop.csv"), 0.2, 42).unwrap_err();
        assert!(matches!(err, ModelError::Io(..)));
    }
}
