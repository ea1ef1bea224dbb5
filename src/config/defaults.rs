//! System-wide default constants.
//!
//! Centralises magic numbers used by request parsing, training and the
//! server. Grouped by subsystem for easy discovery.

// ============================================================================
// Fertilizer Requests
// ============================================================================

/// Soil type assumed when the caller omits `soil`.
pub const SOIL_TYPE: &str = "loam";

/// Land size assumed when the caller omits `landSize`.
pub const LAND_SIZE: f64 = 1.0;

/// Land unit assumed when the caller omits `landUnit`.
pub const LAND_UNIT: &str = "hectares";

/// Nitrogen reading (kg/ha) assumed when omitted.
pub const NITROGEN: f64 = 60.0;

/// Phosphorus reading (kg/ha) assumed when omitted.
pub const PHOSPHORUS: f64 = 40.0;

/// Potassium reading (kg/ha) assumed when omitted.
pub const POTASSIUM: f64 = 30.0;

// ============================================================================
// Training
// ============================================================================

/// Fraction of rows held out for accuracy reporting.
pub const TEST_FRACTION: f64 = 0.2;

/// Seed for the train/test shuffle.
pub const SPLIT_SEED: u64 = 42;

// ============================================================================
// Data Files
// ============================================================================

pub const DOSE_TABLE_PATH: &str = "data/Fertilizer_dose.csv";
pub const FERTILIZER_TRAINING_PATH: &str = "data/fertilizer_recommendation.csv";
pub const CROP_TRAINING_PATH: &str = "data/Crop_recommendation.csv";
pub const MODEL_DIR: &str = "models";

// ============================================================================
// Server
// ============================================================================

pub const SERVER_ADDR: &str = "0.0.0.0:5000";
