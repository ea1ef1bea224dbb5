use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("IO error ({}): {}", .0.display(), .1)]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Model serialization error ({}): {}", .0.display(), .1)]
    Serialization(PathBuf, #[source] serde_json::Error),

    #[error("Training data is missing column '{0}'")]
    MissingColumn(String),

    #[error("Bad training data at line {line}: {reason}")]
    TrainingData { line: usize, reason: String },

    #[error("Invalid model artifact ({}): {}", .0.display(), .1)]
    InvalidArtifact(PathBuf, String),

    #[error("Training set is empty")]
    EmptyTrainingSet,

    #[error("Training failed: {0}")]
    Training(String),

    #[error("Model has no classes")]
    EmptyModel,

    #[error("Expected {expected} features, got {got}")]
    FeatureMismatch { expected: usize, got: usize },

    #[error("Prediction failed: {0}")]
    Prediction(String),

    #[error("Unknown {field} '{value}'")]
    UnknownCategory {
        field: String,
        value: String,
        valid: Vec<String>,
    },
}
