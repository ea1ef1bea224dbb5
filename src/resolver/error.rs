use thiserror::Error;

/// Failures surfaced by [`super::FertilizerResolver::resolve`].
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("{0}")]
    InvalidInput(String),

    /// Soil or crop outside the encoders' trained vocabulary
    #[error("Unknown {field} '{value}'")]
    UnknownCategory {
        field: String,
        value: String,
        valid_crops: Vec<String>,
        valid_soils: Vec<String>,
    },

    /// The dosage table has no rows for the crop
    #[error("No fertilizer data found for crop '{crop}'")]
    NoDataForCrop {
        crop: String,
        available_crops: Vec<String>,
    },

    #[error("{0}")]
    Internal(String),
}
