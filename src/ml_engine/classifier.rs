//! Classifiers behind the recommendation endpoints.
//!
//! [`Classifier`] is the seam the resolver and handlers depend on. The
//! bundled implementation is a standardized nearest-centroid model:
//!
//! 1. Each feature is z-scored with the training set's mean and population
//!    standard deviation (constant features keep unit scale).
//! 2. One centroid per class is the mean of its standardized samples.
//! 3. Prediction picks the centroid with the smallest squared Euclidean
//!    distance; ties go to the class that sorts first.

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::collections::BTreeMap;

use super::ModelError;

/// Minimum standard deviation before a feature is treated as constant.
const MIN_STD: f64 = 1e-8;

/// A trained single-label classifier. Implementations are immutable after
/// construction and shared across request handlers.
pub trait Classifier: Send + Sync {
    /// Names of the features `predict` expects, in order.
    fn feature_names(&self) -> &[String];

    /// Every label the model can return.
    fn classes(&self) -> &[String];

    /// Most likely class for one feature vector.
    fn predict(&self, features: &[f64]) -> Result<String, ModelError>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearestCentroidClassifier {
    feature_names: Vec<String>,
    means: Vec<f64>,
    stds: Vec<f64>,
    classes: Vec<String>,
    centroids: Vec<Vec<f64>>,
}

impl NearestCentroidClassifier {
    /// Fit from row-major samples and their labels.
    pub fn fit(
        feature_names: Vec<String>,
        samples: &[Vec<f64>],
        labels: &[String],
    ) -> Result<Self, ModelError> {
        if samples.is_empty() {
            return Err(ModelError::EmptyTrainingSet);
        }
        if samples.len() != labels.len() {
            return Err(ModelError::Training(format!(
                "{} samples but {} labels",
                samples.len(),
                labels.len()
            )));
        }
        let dim = feature_names.len();
        if let Some(bad) = samples.iter().find(|s| s.len() != dim) {
            return Err(ModelError::FeatureMismatch {
                expected: dim,
                got: bad.len(),
            });
        }

        let mut means = Vec::with_capacity(dim);
        let mut stds = Vec::with_capacity(dim);
        for d in 0..dim {
            let column: Vec<f64> = samples.iter().map(|s| s[d]).collect();
            let mean = column.iter().mean();
            let std = column.iter().population_std_dev();
            means.push(mean);
            stds.push(if std.is_finite() && std > MIN_STD { std } else { 1.0 });
        }

        // BTreeMap keeps classes sorted, which fixes tie-breaking.
        let mut sums: BTreeMap<&str, (Vec<f64>, usize)> = BTreeMap::new();
        for (sample, label) in samples.iter().zip(labels) {
            let entry = sums
                .entry(label.as_str())
                .or_insert_with(|| (vec![0.0; dim], 0));
            for (d, x) in sample.iter().enumerate() {
                entry.0[d] += (x - means[d]) / stds[d];
            }
            entry.1 += 1;
        }

        let mut classes = Vec::with_capacity(sums.len());
        let mut centroids = Vec::with_capacity(sums.len());
        for (label, (sum, count)) in sums {
            classes.push(label.to_string());
            centroids.push(sum.into_iter().map(|v| v / count as f64).collect());
        }

        Ok(Self {
            feature_names,
            means,
            stds,
            classes,
            centroids,
        })
    }

    fn standardize(&self, features: &[f64]) -> Vec<f64> {
        features
            .iter()
            .zip(self.means.iter().zip(&self.stds))
            .map(|(x, (m, s))| (x - m) / s)
            .collect()
    }

    /// Check that the model's vectors agree in shape.
    ///
    /// `fit` always produces a consistent model; this guards models read
    /// back from disk.
    pub fn check(&self) -> Result<(), String> {
        let dim = self.feature_names.len();
        if self.classes.is_empty() {
            return Err("model has no classes".to_string());
        }
        if self.centroids.len() != self.classes.len() {
            return Err(format!(
                "{} centroids for {} classes",
                self.centroids.len(),
                self.classes.len()
            ));
        }
        if self.means.len() != dim || self.stds.len() != dim {
            return Err(format!(
                "{} features but {} means and {} stds",
                dim,
                self.means.len(),
                self.stds.len()
            ));
        }
        if let Some(c) = self.centroids.iter().position(|c| c.len() != dim) {
            return Err(format!(
                "centroid for '{}' has {} values, expected {dim}",
                self.classes[c],
                self.centroids[c].len()
            ));
        }
        if self.stds.iter().any(|s| !s.is_finite() || *s <= 0.0)
            || self.means.iter().any(|m| !m.is_finite())
        {
            return Err("non-finite mean or non-positive std".to_string());
        }
        Ok(())
    }

    /// Precision per class over a labelled set: of the samples predicted as
    /// a class, the fraction that truly belong to it. Classes that occur in
    /// `labels` but are never predicted get 0.0.
    pub fn per_class_precision(
        &self,
        samples: &[Vec<f64>],
        labels: &[String],
    ) -> BTreeMap<String, f64> {
        // class -> (predicted, correct)
        let mut counts: BTreeMap<String, (usize, usize)> = BTreeMap::new();
        for label in labels {
            counts.entry(label.clone()).or_default();
        }
        for (sample, label) in samples.iter().zip(labels) {
            let Ok(predicted) = self.predict(sample) else {
                continue;
            };
            let entry = counts.entry(predicted.clone()).or_default();
            entry.0 += 1;
            if &predicted == label {
                entry.1 += 1;
            }
        }
        counts
            .into_iter()
            .map(|(class, (predicted, correct))| {
                let precision = if predicted == 0 {
                    0.0
                } else {
                    correct as f64 / predicted as f64
                };
                (class, precision)
            })
            .collect()
    }

    /// Fraction of `labels` predicted correctly. `None` for an empty set.
    pub fn accuracy(&self, samples: &[Vec<f64>], labels: &[String]) -> Option<f64> {
        if samples.is_empty() {
            return None;
        }
        let correct = samples
            .iter()
            .zip(labels)
            .filter(|(s, l)| self.predict(s).is_ok_and(|p| &p == *l))
            .count();
        Some(correct as f64 / samples.len() as f64)
    }
}

impl Classifier for NearestCentroidClassifier {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn predict(&self, features: &[f64]) -> Result<String, ModelError> {
        if features.len() != self.feature_names.len() {
            return Err(ModelError::FeatureMismatch {
                expected: self.feature_names.len(),
                got: features.len(),
            });
        }
        if let Some(bad) = features.iter().position(|x| !x.is_finite()) {
            return Err(ModelError::Prediction(format!(
                "feature '{}' is not finite",
                self.feature_names[bad]
            )));
        }

        let point = self.standardize(features);
        let mut best: Option<(usize, f64)> = None;
        for (i, centroid) in self.centroids.iter().enumerate() {
            let dist = sq_dist(&point, centroid);
            if best.map_or(true, |(_, d)| dist < d) {
                best = Some((i, dist));
            }
        }

        best.and_then(|(i, _)| self.classes.get(i).cloned())
            .ok_or(ModelError::EmptyModel)
    }
}

/// Squared Euclidean distance.
fn sq_dist(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
}
