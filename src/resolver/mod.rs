//! Fertilizer Recommendation Resolver
//!
//! Turns a [`FertilizerRequest`] into a [`RecommendationResult`]:
//!
//! 1. Filter the dosage table to the requested crop (`NoDataForCrop` if empty)
//! 2. Encode soil and crop against the training vocabularies (`UnknownCategory`)
//! 3. Predict a fertilizer from `[soil, crop, N, P, K]`
//! 4. Normalize land size to hectares and scale every matching row
//! 5. Partition into organic / chemical, keeping table order
//! 6. Pick a primary option, organic first
//!
//! The table lookup runs before encoding so a crop missing from both the
//! table and the vocabulary reports the table's crop list.

mod error;

pub use error::ResolveError;

use std::sync::Arc;
use tracing::{debug, warn};

use crate::ml_engine::{FertilizerModel, ModelError};
use crate::reference::DoseTable;
use crate::types::{
    DoseTableRow, FertilizerCategory, FertilizerOption, FertilizerRequest, LandUnit,
    Recommendation, RecommendationResult,
};

/// Message attached when at least one organic option exists.
pub const ORGANIC_MESSAGE: &str =
    "Organic fertilizers are recommended for sustainable farming.";

/// Message attached when only chemical options exist (or none at all).
pub const CHEMICAL_MESSAGE: &str =
    "Chemical fertilizers available. Consider organic alternatives when possible.";

/// Resolves fertilizer recommendations against shared, read-only models and
/// reference data.
#[derive(Debug, Clone)]
pub struct FertilizerResolver {
    model: Arc<FertilizerModel>,
    dose_table: Arc<DoseTable>,
}

impl FertilizerResolver {
    pub fn new(model: Arc<FertilizerModel>, dose_table: Arc<DoseTable>) -> Self {
        Self { model, dose_table }
    }

    pub fn dose_table(&self) -> &DoseTable {
        &self.dose_table
    }

    pub fn model(&self) -> &FertilizerModel {
        &self.model
    }

    /// Resolve one request.
    pub fn resolve(&self, req: &FertilizerRequest) -> Result<RecommendationResult, ResolveError> {
        let crop = req.crop_type.trim();
        if crop.is_empty() {
            return Err(ResolveError::InvalidInput("crop is required".to_string()));
        }

        let rows = self.dose_table.rows_for_crop(crop);
        if rows.is_empty() {
            return Err(ResolveError::NoDataForCrop {
                crop: crop.to_string(),
                available_crops: self.dose_table.known_crops(),
            });
        }

        let predicted_fertilizer = self.predict(req)?;

        if !LandUnit::is_recognized(&req.land_unit) {
            debug!(unit = %req.land_unit, "Unrecognized land unit, treating as hectares");
        }
        let hectares = req.hectares();

        let (organic_options, chemical_options) =
            partition_options(rows.iter().copied(), hectares);
        if !organic_options
            .iter()
            .chain(&chemical_options)
            .all(|o| o.n.is_finite() && o.p.is_finite() && o.k.is_finite())
        {
            return Err(ResolveError::InvalidInput(format!(
                "landSize too large: {} {} overflows the scaled dosage",
                req.land_size, req.land_unit
            )));
        }
        let recommendation = select_primary(&organic_options, &chemical_options);

        if !organic_options
            .iter()
            .chain(&chemical_options)
            .any(|o| o.name.trim().eq_ignore_ascii_case(predicted_fertilizer.trim()))
        {
            debug!(
                crop,
                predicted = %predicted_fertilizer,
                "Predicted fertilizer has no dosage row for this crop"
            );
        }

        Ok(RecommendationResult {
            predicted_fertilizer,
            organic_options,
            chemical_options,
            recommendation,
            crop_type: req.crop_type.clone(),
            soil_type: req.soil_type.clone(),
            land_size: req.land_size,
            land_unit: req.land_unit.clone(),
            hectares,
            nitrogen: req.nitrogen,
            phosphorus: req.phosphorus,
            potassium: req.potassium,
        })
    }

    /// Encode the categorical inputs and ask the classifier for a label.
    pub fn predict(&self, req: &FertilizerRequest) -> Result<String, ResolveError> {
        let m = &self.model;
        let soil = m
            .soil_encoder
            .transform(&req.soil_type)
            .map_err(|e| self.unknown_category(e))?;
        let crop = m
            .crop_encoder
            .transform(&req.crop_type)
            .map_err(|e| self.unknown_category(e))?;

        #[allow(clippy::cast_precision_loss)]
        let features = [
            soil as f64,
            crop as f64,
            req.nitrogen,
            req.phosphorus,
            req.potassium,
        ];
        m.classifier.predict(&features).map_err(|e| {
            warn!(error = %e, "Fertilizer classifier failed");
            ResolveError::Internal(e.to_string())
        })
    }

    fn unknown_category(&self, err: ModelError) -> ResolveError {
        match err {
            ModelError::UnknownCategory { field, value, .. } => ResolveError::UnknownCategory {
                field,
                value,
                valid_crops: self.model.crop_encoder.classes().to_vec(),
                valid_soils: self.model.soil_encoder.classes().to_vec(),
            },
            other => ResolveError::Internal(other.to_string()),
        }
    }
}

/// Scale each row by `hectares` and split into (organic, chemical), keeping order.
pub fn partition_options<'a>(
    rows: impl IntoIterator<Item = &'a DoseTableRow>,
    hectares: f64,
) -> (Vec<FertilizerOption>, Vec<FertilizerOption>) {
    let mut organic = Vec::new();
    let mut chemical = Vec::new();
    for row in rows {
        let option = FertilizerOption::from_row(row, hectares);
        match row.category() {
            FertilizerCategory::Organic => organic.push(option),
            FertilizerCategory::Chemical => chemical.push(option),
        }
    }
    (organic, chemical)
}

/// Organic wins whenever any organic option exists.
pub fn select_primary(
    organic: &[FertilizerOption],
    chemical: &[FertilizerOption],
) -> Recommendation {
    match organic.first() {
        Some(first) => Recommendation {
            primary: Some(first.clone()),
            message: ORGANIC_MESSAGE.to_string(),
        },
        None => Recommendation {
            primary: chemical.first().cloned(),
            message: CHEMICAL_MESSAGE.to_string(),
        },
    }
}
