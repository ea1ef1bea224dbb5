//! Crop recommendation input types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fields the crop endpoint requires in every request body.
pub const REQUIRED_CROP_FIELDS: [&str; 7] =
    ["N", "P", "K", "temperature", "humidity", "ph", "rainfall"];

/// Soil and climate readings for one field, keyed by feature name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CropFeatures {
    values: BTreeMap<String, f64>,
}

impl CropFeatures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// Build the feature vector for a model trained on `names`, in that order.
    ///
    /// Returns the first name with no reading on failure.
    pub fn vector_for(&self, names: &[String]) -> Result<Vec<f64>, String> {
        names
            .iter()
            .map(|n| self.get(n).ok_or_else(|| n.clone()))
            .collect()
    }
}

/// Crop endpoint response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropPrediction {
    pub prediction: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_follows_model_order() {
        let mut f = CropFeatures::new();
        f.insert("N", 90.0);
        f.insert("ph", 6.5);
        f.insert("rainfall", 200.0);
        let v = f.vector_for(&["ph".to_string(), "N".to_string()]).unwrap();
        assert_eq!(v, vec![6.5, 90.0]);
    }

    #[test]
    fn test_vector_reports_missing_feature() {
        let f = CropFeatures::new();
        assert_eq!(f.vector_for(&["humidity".to_string()]), Err("humidity".to_string()));
    }
}
