//! Fertilizer recommendation endpoint

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use tracing::info;

use crate::api::error::ApiError;
use crate::config::DefaultsConfig;
use crate::types::{FertilizerRequest, RecommendationResult};

use super::ServiceState;

/// Raw query string of `GET /get_fertilizer`.
///
/// Everything arrives as text so that a malformed number can be reported
/// as a JSON 400 instead of an extractor rejection. Empty values count as
/// omitted.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FertilizerQuery {
    pub crop: Option<String>,
    pub soil: Option<String>,
    pub land_size: Option<String>,
    pub land_unit: Option<String>,
    pub nitrogen: Option<String>,
    pub phosphorus: Option<String>,
    pub potassium: Option<String>,
}

fn present(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

fn parse_number(name: &str, value: Option<&String>, default: f64) -> Result<f64, ApiError> {
    let Some(raw) = present(value) else {
        return Ok(default);
    };
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(ApiError::bad_request(format!(
            "Invalid value for {name}: '{raw}' is not a number"
        ))),
    }
}

impl FertilizerQuery {
    /// Fill omitted parameters from `defaults` and validate numbers.
    pub fn into_request(self, defaults: &DefaultsConfig) -> Result<FertilizerRequest, ApiError> {
        let crop = present(self.crop.as_ref())
            .ok_or_else(|| ApiError::bad_request("Missing required query parameter: crop"))?;

        let mut req = defaults.request_for(crop);
        if let Some(soil) = present(self.soil.as_ref()) {
            req.soil_type = soil.to_string();
        }
        if let Some(unit) = present(self.land_unit.as_ref()) {
            req.land_unit = unit.to_string();
        }
        req.land_size = parse_number("landSize", self.land_size.as_ref(), req.land_size)?;
        req.nitrogen = parse_number("nitrogen", self.nitrogen.as_ref(), req.nitrogen)?;
        req.phosphorus = parse_number("phosphorus", self.phosphorus.as_ref(), req.phosphorus)?;
        req.potassium = parse_number("potassium", self.potassium.as_ref(), req.potassium)?;
        Ok(req)
    }
}

/// GET /get_fertilizer - Resolve a fertilizer recommendation
pub async fn get_fertilizer(
    State(state): State<ServiceState>,
    query: Result<Query<FertilizerQuery>, QueryRejection>,
) -> Result<Json<RecommendationResult>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let req = query.into_request(&state.defaults)?;

    let result = state.resolver.resolve(&req)?;
    info!(
        crop = %req.crop_type,
        soil = %req.soil_type,
        hectares = result.hectares,
        predicted = %result.predicted_fertilizer,
        organic = result.organic_options.len(),
        chemical = result.chemical_options.len(),
        "Fertilizer recommendation resolved"
    );
    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::handlers::test_support;
    use axum::http::StatusCode;

    fn query(crop: &str) -> FertilizerQuery {
        FertilizerQuery {
            crop: Some(crop.to_string()),
            ..FertilizerQuery::default()
        }
    }

    #[test]
    fn test_omitted_parameters_use_defaults() {
        let req = query("maize").into_request(&DefaultsConfig::default()).unwrap();
        assert_eq!(req, FertilizerRequest::for_crop("maize"));
    }

    #[test]
    fn test_empty_values_count_as_omitted() {
        let mut q = query("maize");
        q.land_size = Some(String::new());
        q.soil = Some("  ".to_string());
        let req = q.into_request(&DefaultsConfig::default()).unwrap();
        assert_eq!(req.land_size, 1.0);
        assert_eq!(req.soil_type, "loam");
    }

    #[test]
    fn test_configured_defaults_apply() {
        let defaults = DefaultsConfig {
            soil: "clay".to_string(),
            nitrogen: 10.0,
            ..DefaultsConfig::default()
        };
        let req = query("rice").into_request(&defaults).unwrap();
        assert_eq!(req.soil_type, "clay");
        assert_eq!(req.nitrogen, 10.0);
    }

    #[test]
    fn test_missing_crop_is_bad_request() {
        let err = FertilizerQuery::default()
            .into_request(&DefaultsConfig::default())
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_malformed_number_is_bad_request() {
        let mut q = query("maize");
        q.potassium = Some("lots".to_string());
        let err = q.into_request(&DefaultsConfig::default()).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(err.body["error"].as_str().unwrap().contains("potassium"));

        let mut q = query("maize");
        q.land_size = Some("NaN".to_string());
        assert!(q.into_request(&DefaultsConfig::default()).is_err());
    }

    #[tokio::test]
    async fn test_get_fertilizer_handler() {
        let state = test_support::state(false);
        let mut q = query("Maize");
        q.land_size = Some("2".to_string());
        let Json(result) = get_fertilizer(State(state), Ok(Query(q))).await.unwrap();
        assert_eq!(result.hectares, 2.0);
        assert_eq!(result.chemical_options[0].n, 240.0);
        assert_eq!(result.recommendation.primary.unwrap().name, "Farmyard Manure");
    }
}
