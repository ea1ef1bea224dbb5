//! Fertilizer recommendation types: requests, dosage rows, scaled options, results.

use serde::{Deserialize, Serialize};

/// Hectares per acre.
pub const HECTARES_PER_ACRE: f64 = 0.404_686;

/// Square metres per hectare.
pub const SQ_M_PER_HECTARE: f64 = 10_000.0;

// ============================================================================
// Land Units
// ============================================================================

/// Unit a land size is expressed in.
///
/// Parsing never fails: any label other than `acres` or `sq_m` is read as
/// hectares, including typos and the empty string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LandUnit {
    Hectares,
    Acres,
    SqM,
}

impl LandUnit {
    /// Interpret a unit label. Unrecognized labels fall back to hectares.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "acres" => Self::Acres,
            "sq_m" => Self::SqM,
            _ => Self::Hectares,
        }
    }

    /// Whether `label` names a unit explicitly (as opposed to falling back).
    pub fn is_recognized(label: &str) -> bool {
        matches!(
            label.trim().to_lowercase().as_str(),
            "hectares" | "acres" | "sq_m"
        )
    }

    /// Convert a land size in this unit to hectares.
    pub fn to_hectares(self, land_size: f64) -> f64 {
        match self {
            Self::Hectares => land_size,
            Self::Acres => land_size * HECTARES_PER_ACRE,
            Self::SqM => land_size / SQ_M_PER_HECTARE,
        }
    }
}

// ============================================================================
// Request
// ============================================================================

/// A fully-defaulted fertilizer recommendation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FertilizerRequest {
    pub crop_type: String,
    pub soil_type: String,
    /// Assumed positive; not enforced
    pub land_size: f64,
    /// Raw unit label as supplied by the caller
    pub land_unit: String,
    pub nitrogen: f64,
    pub phosphorus: f64,
    pub potassium: f64,
}

impl FertilizerRequest {
    /// Request for `crop` with every other field at its built-in default.
    pub fn for_crop(crop: impl Into<String>) -> Self {
        Self {
            crop_type: crop.into(),
            ..Self::default()
        }
    }

    /// Land size normalized to hectares.
    pub fn hectares(&self) -> f64 {
        LandUnit::from_label(&self.land_unit).to_hectares(self.land_size)
    }
}

impl Default for FertilizerRequest {
    fn default() -> Self {
        use crate::config::defaults;
        Self {
            crop_type: String::new(),
            soil_type: defaults::SOIL_TYPE.to_string(),
            land_size: defaults::LAND_SIZE,
            land_unit: defaults::LAND_UNIT.to_string(),
            nitrogen: defaults::NITROGEN,
            phosphorus: defaults::PHOSPHORUS,
            potassium: defaults::POTASSIUM,
        }
    }
}

// ============================================================================
// Dosage Table
// ============================================================================

/// Partition a dosage row falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FertilizerCategory {
    Organic,
    /// Chemical or anything not labelled organic
    Chemical,
}

impl FertilizerCategory {
    pub fn from_label(label: &str) -> Self {
        if label.trim().eq_ignore_ascii_case("organic") {
            Self::Organic
        } else {
            Self::Chemical
        }
    }
}

/// One row of the reference dosage table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoseTableRow {
    pub crop_type: String,
    pub fertilizer_name: String,
    /// Type label exactly as written in the table
    pub fertilizer_type: String,
    pub n_per_ha: f64,
    pub p_per_ha: f64,
    pub k_per_ha: f64,
    pub notes: String,
}

impl DoseTableRow {
    pub fn category(&self) -> FertilizerCategory {
        FertilizerCategory::from_label(&self.fertilizer_type)
    }

    /// Whether this row belongs to `crop`, ignoring case and surrounding whitespace.
    pub fn matches_crop(&self, crop: &str) -> bool {
        self.crop_type.trim().to_lowercase() == crop.trim().to_lowercase()
    }
}

// ============================================================================
// Results
// ============================================================================

/// A dosage row scaled to the requested land area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FertilizerOption {
    pub name: String,
    #[serde(rename = "type")]
    pub fertilizer_type: String,
    #[serde(rename = "N")]
    pub n: f64,
    #[serde(rename = "P")]
    pub p: f64,
    #[serde(rename = "K")]
    pub k: f64,
    pub notes: String,
    pub n_per_ha: f64,
    pub p_per_ha: f64,
    pub k_per_ha: f64,
}

impl FertilizerOption {
    /// Scale a dosage row by `hectares`, rounding each nutrient to 2 decimals.
    pub fn from_row(row: &DoseTableRow, hectares: f64) -> Self {
        Self {
            name: row.fertilizer_name.clone(),
            fertilizer_type: row.fertilizer_type.clone(),
            n: round2(row.n_per_ha * hectares),
            p: round2(row.p_per_ha * hectares),
            k: round2(row.k_per_ha * hectares),
            notes: row.notes.clone(),
            n_per_ha: row.n_per_ha,
            p_per_ha: row.p_per_ha,
            k_per_ha: row.k_per_ha,
        }
    }
}

/// Primary pick plus a human-readable message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub primary: Option<FertilizerOption>,
    pub message: String,
}

/// Full response of the fertilizer resolver.
///
/// `predicted_fertilizer` comes from the classifier and is not guaranteed to
/// appear in either option list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationResult {
    pub predicted_fertilizer: String,
    pub organic_options: Vec<FertilizerOption>,
    pub chemical_options: Vec<FertilizerOption>,
    pub recommendation: Recommendation,
    pub crop_type: String,
    pub soil_type: String,
    pub land_size: f64,
    pub land_unit: String,
    pub hectares: f64,
    pub nitrogen: f64,
    pub phosphorus: f64,
    pub potassium: f64,
}

/// Round to 2 decimal places, half away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(kind: &str) -> DoseTableRow {
        DoseTableRow {
            crop_type: "Maize".to_string(),
            fertilizer_name: "Urea".to_string(),
            fertilizer_type: kind.to_string(),
            n_per_ha: 120.0,
            p_per_ha: 0.0,
            k_per_ha: 0.0,
            notes: "Split application".to_string(),
        }
    }

    #[test]
    fn test_land_unit_conversions() {
        assert_eq!(LandUnit::from_label("hectares").to_hectares(3.0), 3.0);
        assert!((LandUnit::from_label("acres").to_hectares(5.0) - 2.02343).abs() < 1e-9);
        assert!((LandUnit::from_label("sq_m").to_hectares(25_000.0) - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_unrecognized_unit_falls_back_to_hectares() {
        assert_eq!(LandUnit::from_label("bigha"), LandUnit::Hectares);
        assert_eq!(LandUnit::from_label(""), LandUnit::Hectares);
        assert!(!LandUnit::is_recognized("bigha"));
        assert!(LandUnit::is_recognized(" Acres "));
    }

    #[test]
    fn test_category_is_case_insensitive() {
        assert_eq!(row("ORGANIC").category(), FertilizerCategory::Organic);
        assert_eq!(row(" organic ").category(), FertilizerCategory::Organic);
        assert_eq!(row("Chemical").category(), FertilizerCategory::Chemical);
        assert_eq!(row("Bio-fertilizer").category(), FertilizerCategory::Chemical);
    }

    #[test]
    fn test_matches_crop_ignores_case_and_whitespace() {
        let r = row("Chemical");
        assert!(r.matches_crop("maize"));
        assert!(r.matches_crop("  MAIZE "));
        assert!(!r.matches_crop("rice"));
    }

    #[test]
    fn test_option_scaling_rounds_to_two_decimals() {
        let mut r = row("Chemical");
        r.n_per_ha = 33.333;
        let opt = FertilizerOption::from_row(&r, 0.404_686);
        assert_eq!(opt.n, 13.49);
        assert_eq!(opt.n_per_ha, 33.333);
    }

    #[test]
    fn test_exact_halves_round_away_from_zero() {
        let mut r = row("Organic");
        r.n_per_ha = 0.25;
        r.p_per_ha = -0.25;
        let opt = FertilizerOption::from_row(&r, 0.5);
        assert_eq!(opt.n, 0.13);
        assert_eq!(opt.p, -0.13);
        assert_eq!(round2(2.5), 2.5);
        assert_eq!(round2(0.375), 0.38);
    }

    #[test]
    fn test_option_serializes_with_nutrient_keys() {
        let opt = FertilizerOption::from_row(&row("Chemical"), 2.0);
        let v = serde_json::to_value(&opt).unwrap();
        assert_eq!(v["N"], 240.0);
        assert_eq!(v["type"], "Chemical");
        assert_eq!(v["nPerHa"], 120.0);
    }

    #[test]
    fn test_request_defaults() {
        let req = FertilizerRequest::for_crop("maize");
        assert_eq!(req.soil_type, "loam");
        assert_eq!(req.land_size, 1.0);
        assert_eq!(req.land_unit, "hectares");
        assert_eq!((req.nitrogen, req.phosphorus, req.potassium), (60.0, 40.0, 30.0));
    }
}
