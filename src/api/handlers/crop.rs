//! Crop recommendation endpoint

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Map, Value};
use tracing::{info, warn};

use crate::api::error::ApiError;
use crate::types::{CropFeatures, CropPrediction, REQUIRED_CROP_FIELDS};

use super::ServiceState;

fn missing_fields() -> ApiError {
    ApiError {
        status: StatusCode::BAD_REQUEST,
        body: json!({
            "error": "Missing one or more required fields",
            "required": REQUIRED_CROP_FIELDS,
        }),
    }
}

/// Accept a JSON number or a string holding one.
fn numeric(value: &Value) -> Option<f64> {
    let v = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    v.is_finite().then_some(v)
}

/// Validate a request body into crop features.
///
/// Every required field must be present; extra fields are ignored.
pub fn parse_crop_features(body: &Map<String, Value>) -> Result<CropFeatures, ApiError> {
    if REQUIRED_CROP_FIELDS.iter().any(|f| !body.contains_key(*f)) {
        return Err(missing_fields());
    }
    let mut features = CropFeatures::new();
    for field in REQUIRED_CROP_FIELDS {
        let value = numeric(&body[field])
            .ok_or_else(|| ApiError::bad_request(format!("Field '{field}' must be numeric")))?;
        features.insert(field, value);
    }
    Ok(features)
}

/// POST /predict - Recommend a crop from soil and climate readings
pub async fn predict_crop(
    State(state): State<ServiceState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<CropPrediction>, ApiError> {
    let Ok(Json(Value::Object(body))) = body else {
        return Err(missing_fields());
    };
    let features = parse_crop_features(&body)?;

    let model = state.crop_model.as_ref().ok_or_else(|| {
        warn!("Crop prediction requested but no crop model is loaded");
        ApiError::internal("Crop model is not loaded")
    })?;

    let vector = features
        .vector_for(model.feature_names())
        .map_err(|name| ApiError::internal(format!("Model expects unknown feature '{name}'")))?;
    let prediction = model
        .predict(&vector)
        .map_err(|e| ApiError::internal(e.to_string()))?;

    info!(prediction = %prediction, "Crop prediction");
    Ok(Json(CropPrediction { prediction }))
}
