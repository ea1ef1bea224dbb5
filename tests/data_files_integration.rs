//! Shipped Data Integration Tests
//!
//! Loads the CSVs under `data/`, trains both models the way `agrifusion
//! train` does, and resolves recommendations against the real dosage table.

use agrifusion::config::{defaults, DataConfig};
use agrifusion::ml_engine::training::{train_crop_file, train_fertilizer_file};
use agrifusion::ml_engine::{ModelRegistry, ModelStore};
use agrifusion::reference::DoseTable;
use agrifusion::resolver::{FertilizerResolver, ResolveError};
use agrifusion::FertilizerRequest;
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn data_path(file: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("data").join(file)
}

fn data_config(model_dir: &Path) -> DataConfig {
    DataConfig {
        dose_table: data_path("Fertilizer_dose.csv"),
        fertilizer_training: data_path("fertilizer_recommendation.csv"),
        crop_training: data_path("Crop_recommendation.csv"),
        model_dir: model_dir.to_path_buf(),
    }
}

#[test]
fn dose_table_loads() {
    let table = DoseTable::load(&data_path("Fertilizer_dose.csv")).unwrap();
    assert!(!table.is_empty());
    assert!(table.known_crops().iter().any(|c| c == "Maize"));
}

#[test]
fn training_reports_held_out_accuracy() {
    let (_, report) = train_fertilizer_file(
        &data_path("fertilizer_recommendation.csv"),
        defaults::TEST_FRACTION,
        defaults::SPLIT_SEED,
    )
    .unwrap();
    assert!(report.test_samples > 0);
    assert!(report.accuracy.is_some());

    let (_, report) = train_crop_file(
        &data_path("Crop_recommendation.csv"),
        defaults::TEST_FRACTION,
        defaults::SPLIT_SEED,
    )
    .unwrap();
    assert_eq!(report.classes, 8);
    assert_eq!(report.test_samples, 16, "two held-out rows per crop");
    assert_eq!(report.per_class_precision.len(), 8);
    assert!(report.accuracy.unwrap() >= 0.5, "{report:?}");
}

#[test]
fn default_request_resolves_for_every_trained_crop_with_doses() {
    let dir = tempfile::tempdir().unwrap();
    let registry = ModelRegistry::load(&data_config(dir.path())).unwrap();
    let table = DoseTable::load(&data_path("Fertilizer_dose.csv")).unwrap();
    let resolver = FertilizerResolver::new(registry.fertilizer, Arc::new(table));

    for crop in ["Maize", "Paddy", "Wheat", "Cotton", "Sugarcane", "Pulses"] {
        let result = resolver
            .resolve(&FertilizerRequest::for_crop(crop))
            .unwrap_or_else(|e| panic!("{crop}: {e}"));
        assert!(result.recommendation.primary.is_some(), "{crop}");
        assert!(!result.predicted_fertilizer.is_empty());
    }
}

#[test]
fn crop_only_in_dose_table_is_unknown_category() {
    let dir = tempfile::tempdir().unwrap();
    let registry = ModelRegistry::load(&data_config(dir.path())).unwrap();
    let table = DoseTable::load(&data_path("Fertilizer_dose.csv")).unwrap();
    let resolver = FertilizerResolver::new(registry.fertilizer, Arc::new(table));

    // Rice has dosage rows but the fertilizer training data calls it Paddy
    assert!(matches!(
        resolver.resolve(&FertilizerRequest::for_crop("rice")),
        Err(ResolveError::UnknownCategory { .. })
    ));
}

#[test]
fn saved_artifacts_are_preferred_on_next_load() {
    let dir = tempfile::tempdir().unwrap();
    let config = data_config(dir.path());

    let (artifacts, _) = train_fertilizer_file(&config.fertilizer_training, 0.2, 42).unwrap();
    let store = ModelStore::new(dir.path());
    store.save_fertilizer(&artifacts).unwrap();

    let registry = ModelRegistry::load(&config).unwrap();
    assert_eq!(
        registry.fertilizer.crop_encoder.classes(),
        artifacts.crop_encoder.classes()
    );
    assert!(registry.crop.is_some(), "crop model is fitted from CSV");
}
