//! Label encoding for categorical features.
//!
//! Classes are the distinct lower-cased, trimmed training values in sorted
//! order; a value's id is its position. Lookups normalize the same way.

use serde::{Deserialize, Serialize};

use super::ModelError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    /// Feature this encoder belongs to (e.g. "soil", "crop")
    field: String,
    classes: Vec<String>,
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

impl LabelEncoder {
    /// Fit an encoder from the raw training values of `field`.
    pub fn fit<I, S>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut classes: Vec<String> = values.into_iter().map(|v| normalize(v.as_ref())).collect();
        classes.sort();
        classes.dedup();
        Self {
            field: field.into(),
            classes,
        }
    }

    /// Known classes in id order.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Encode `value`, failing with [`ModelError::UnknownCategory`] when it
    /// was never seen during training.
    pub fn transform(&self, value: &str) -> Result<usize, ModelError> {
        let key = normalize(value);
        self.classes
            .binary_search(&key)
            .map_err(|_| ModelError::UnknownCategory {
                field: self.field.clone(),
                value: value.to_string(),
                valid: self.classes.clone(),
            })
    }

    /// Classes must be strictly ascending for lookups to work.
    pub fn check(&self) -> Result<(), String> {
        match self.classes.windows(2).find(|w| w[0] >= w[1]) {
            Some(w) => Err(format!(
                "{} classes not sorted and unique at '{}'",
                self.field, w[1]
            )),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_sorts_and_dedups_lowercased() {
        let enc = LabelEncoder::fit("soil", ["Loam", "clay", "LOAM", " Sandy "]);
        assert_eq!(enc.classes(), &["clay", "loam", "sandy"]);
    }

    #[test]
    fn test_transform_normalizes_input() {
        let enc = LabelEncoder::fit("soil", ["Loam", "clay"]);
        assert_eq!(enc.transform("  LOAM ").unwrap(), 1);
        assert_eq!(enc.transform("clay").unwrap(), 0);
    }

    #[test]
    fn test_check_rejects_unsorted_classes() {
        assert_eq!(LabelEncoder::fit("soil", ["loam", "clay"]).check(), Ok(()));
        let enc: LabelEncoder =
            serde_json::from_str(r#"{"field":"soil","classes":["loam","clay"]}"#).unwrap();
        assert!(enc.check().unwrap_err().contains("clay"));
    }

    #[test]
    fn test_unknown_value_lists_valid_classes() {
        let enc = LabelEncoder::fit("crop", ["maize", "rice"]);
        match enc.transform("quinoa") {
            Err(ModelError::UnknownCategory { field, value, valid }) => {
                assert_eq!(field, "crop");
                assert_eq!(value, "quinoa");
                assert_eq!(valid, vec!["maize", "rice"]);
            }
            other => panic!("expected UnknownCategory, got {other:?}"),
        }
    }
}
