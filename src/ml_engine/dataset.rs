//! Training datasets loaded from CSV.
//!
//! Two layouts are supported:
//!
//! - **Fertilizer**: `Soil Type, Crop Type, Nitrogen, Phosphorus, Potassium,
//!   Fertilizer`. Soil and crop are label-encoded; the feature vector is
//!   `[soil, crop, nitrogen, phosphorus, potassium]`.
//! - **Crop**: `N, P, K, temperature, humidity, ph, label`. Rainfall is
//!   present in the source data but not used as a feature.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::BTreeMap;

use super::{LabelEncoder, ModelError};
use crate::reference::csv::CsvTable;

pub const FERTILIZER_FEATURES: [&str; 5] = ["soil", "crop", "nitrogen", "phosphorus", "potassium"];
pub const CROP_FEATURES: [&str; 6] = ["N", "P", "K", "temperature", "humidity", "ph"];

const FERT_COLUMNS: [&str; 6] = [
    "Soil Type",
    "Crop Type",
    "Nitrogen",
    "Phosphorus",
    "Potassium",
    "Fertilizer",
];
const CROP_LABEL_COLUMN: &str = "label";

/// Labelled samples ready for fitting.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub feature_names: Vec<String>,
    pub samples: Vec<Vec<f64>>,
    pub labels: Vec<String>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Stratified split: hold out `test_fraction` of each label's rows.
    ///
    /// Rows are grouped by label in sorted label order and each group is
    /// shuffled with one seeded RNG, so the split is reproducible. A label
    /// with at least two rows always lands in both halves when
    /// `test_fraction` is positive; a single-row label stays in training.
    pub fn split(&self, test_fraction: f64, seed: u64) -> (Self, Self) {
        let frac = test_fraction.clamp(0.0, 1.0);
        let mut by_label: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
        for (i, label) in self.labels.iter().enumerate() {
            by_label.entry(label.as_str()).or_default().push(i);
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let mut train_idx = Vec::with_capacity(self.len());
        let mut test_idx = Vec::new();
        for group in by_label.values_mut() {
            group.shuffle(&mut rng);
            let n = group.len();
            let min_test = usize::from(frac > 0.0 && n >= 2);
            let n_test = ((n as f64 * frac).round() as usize)
                .max(min_test)
                .min(n.saturating_sub(1));
            test_idx.extend_from_slice(&group[..n_test]);
            train_idx.extend_from_slice(&group[n_test..]);
        }
        (self.subset(&train_idx), self.subset(&test_idx))
    }

    fn subset(&self, idx: &[usize]) -> Self {
        Self {
            feature_names: self.feature_names.clone(),
            samples: idx.iter().map(|&i| self.samples[i].clone()).collect(),
            labels: idx.iter().map(|&i| self.labels[i].clone()).collect(),
        }
    }
}

/// Fertilizer training data plus the encoders fitted on it.
#[derive(Debug, Clone)]
pub struct FertilizerDataset {
    pub soil_encoder: LabelEncoder,
    pub crop_encoder: LabelEncoder,
    pub data: Dataset,
}

fn parse_table(text: &str) -> Result<CsvTable, ModelError> {
    CsvTable::parse(text).ok_or_else(|| ModelError::TrainingData {
        line: 0,
        reason: "no header line".to_string(),
    })
}

/// Parse fertilizer training CSV text and fit its encoders.
pub fn fertilizer_dataset_from_csv_str(text: &str) -> Result<FertilizerDataset, ModelError> {
    let table = parse_table(text)?;
    let cols = table.columns(&FERT_COLUMNS).map_err(ModelError::MissingColumn)?;
    let (soil_col, crop_col, label_col) = (cols[0], cols[1], cols[5]);

    let soil_encoder = LabelEncoder::fit("soil", table.records().iter().map(|r| r.get(soil_col)));
    let crop_encoder = LabelEncoder::fit("crop", table.records().iter().map(|r| r.get(crop_col)));

    let mut data = Dataset {
        feature_names: FERTILIZER_FEATURES.iter().map(|s| s.to_string()).collect(),
        ..Dataset::default()
    };
    for rec in table.records() {
        let bad = |reason: String| ModelError::TrainingData {
            line: rec.line,
            reason,
        };
        let soil = soil_encoder.transform(rec.get(soil_col))?;
        let crop = crop_encoder.transform(rec.get(crop_col))?;
        let mut sample = vec![soil as f64, crop as f64];
        for (&col, name) in cols[2..5].iter().zip(&FERT_COLUMNS[2..5]) {
            sample.push(rec.get_f64(col, name).map_err(bad)?);
        }
        let label = rec.get(label_col);
        if label.is_empty() {
            return Err(bad("empty fertilizer label".to_string()));
        }
        data.samples.push(sample);
        data.labels.push(label.to_string());
    }

    Ok(FertilizerDataset {
        soil_encoder,
        crop_encoder,
        data,
    })
}

/// Parse crop training CSV text.
pub fn crop_dataset_from_csv_str(text: &str) -> Result<Dataset, ModelError> {
    let table = parse_table(text)?;
    let feature_cols = table.columns(&CROP_FEATURES).map_err(ModelError::MissingColumn)?;
    let label_col = table
        .column(CROP_LABEL_COLUMN)
        .ok_or_else(|| ModelError::MissingColumn(CROP_LABEL_COLUMN.to_string()))?;

    let mut data = Dataset {
        feature_names: CROP_FEATURES.iter().map(|s| s.to_string()).collect(),
        ..Dataset::default()
    };
    for rec in table.records() {
        let bad = |reason: String| ModelError::TrainingData {
            line: rec.line,
            reason,
        };
        let sample = feature_cols
            .iter()
            .zip(CROP_FEATURES)
            .map(|(&col, name)| rec.get_f64(col, name).map_err(bad))
            .collect::<Result<Vec<_>, _>>()?;
        let label = rec.get(label_col);
        if label.is_empty() {
            return Err(bad("empty crop label".to_string()));
        }
        data.samples.push(sample);
        data.labels.push(label.to_string());
    }
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FERT: &str = "\
Soil Type,Crop Type,Nitrogen,Phosphorus,Potassium,Fertilizer
Loam,Maize,60,40,30,Urea
Clay,Rice,20,50,10,DAP
loam,maize,55,35,30,Urea
";

    #[test]
    fn test_fertilizer_dataset_encodes_categories() {
        let ds = fertilizer_dataset_from_csv_str(FERT).unwrap();
        assert_eq!(ds.soil_encoder.classes(), &["clay", "loam"]);
        assert_eq!(ds.crop_encoder.classes(), &["maize", "rice"]);
        assert_eq!(ds.data.samples[0], vec![1.0, 0.0, 60.0, 40.0, 30.0]);
        assert_eq!(ds.data.samples[1], vec![0.0, 1.0, 20.0, 50.0, 10.0]);
        assert_eq!(ds.data.labels, vec!["Urea", "DAP", "Urea"]);
    }

    #[test]
    fn test_fertilizer_dataset_bad_number() {
        let text = "Soil Type,Crop Type,Nitrogen,Phosphorus,Potassium,Fertilizer\nLoam,Maize,x,1,1,Urea\n";
        assert!(matches!(
            fertilizer_dataset_from_csv_str(text),
            Err(ModelError::TrainingData { line: 2, .. })
        ));
    }

    #[test]
    fn test_crop_dataset_ignores_rainfall() {
        let text = "N,P,K,temperature,humidity,ph,rainfall,label\n90,42,43,20.8,82,6.5,202.9,rice\n";
        let ds = crop_dataset_from_csv_str(text).unwrap();
        assert_eq!(ds.feature_names, CROP_FEATURES.to_vec());
        assert_eq!(ds.samples[0], vec![90.0, 42.0, 43.0, 20.8, 82.0, 6.5]);
        assert_eq!(ds.labels, vec!["rice"]);
    }

    #[test]
    fn test_crop_dataset_missing_label_column() {
        let text = "N,P,K,temperature,humidity,ph\n1,2,3,4,5,6\n";
        assert!(matches!(
            crop_dataset_from_csv_str(text),
            Err(ModelError::MissingColumn(c)) if c == "label"
        ));
    }

    fn labelled(counts: &[(&str, usize)]) -> Dataset {
        let mut ds = Dataset {
            feature_names: vec!["x".to_string()],
            ..Dataset::default()
        };
        for (label, count) in counts {
            for _ in 0..*count {
                ds.samples.push(vec![ds.samples.len() as f64]);
                ds.labels.push((*label).to_string());
            }
        }
        ds
    }

    #[test]
    fn test_split_is_deterministic_and_disjoint() {
        let ds = labelled(&[("dap", 5), ("urea", 5)]);
        let (train, test) = ds.split(0.2, 42);
        let (train2, test2) = ds.split(0.2, 42);
        assert_eq!(train.len(), 8);
        assert_eq!(test.len(), 2);
        assert_eq!(train.samples, train2.samples);
        assert_eq!(test.samples, test2.samples);
        assert!(test.samples.iter().all(|s| !train.samples.contains(s)));
    }

    #[test]
    fn test_split_is_stratified() {
        let ds = labelled(&[("rice", 12), ("maize", 12), ("chickpea", 2), ("mango", 1)]);
        let (train, test) = ds.split(0.2, 42);
        let count = |d: &Dataset, l: &str| d.labels.iter().filter(|x| *x == l).count();

        assert_eq!(count(&test, "rice"), 2);
        assert_eq!(count(&test, "maize"), 2);
        assert_eq!(count(&test, "chickpea"), 1);
        assert_eq!(count(&test, "mango"), 0);
        for label in ["rice", "maize", "chickpea", "mango"] {
            assert!(count(&train, label) >= 1, "{label} missing from training");
        }
        assert_eq!(train.len() + test.len(), ds.len());
    }

    #[test]
    fn test_zero_fraction_holds_nothing_out() {
        let (train, test) = labelled(&[("a", 3), ("b", 3)]).split(0.0, 42);
        assert_eq!(train.len(), 6);
        assert!(test.is_empty());
    }

    #[test]
    fn test_split_keeps_one_training_row() {
        let ds = Dataset {
            feature_names: vec!["x".to_string()],
            samples: vec![vec![1.0]],
            labels: vec!["a".to_string()],
        };
        let (train, test) = ds.split(0.9, 1);
        assert_eq!(train.len(), 1);
        assert!(test.is_empty());
    }
}
