//! HTTP error bodies.
//!
//! Every failure is a JSON object with an `error` string, plus whatever
//! lists help the caller correct the request:
//!
//! | Failure           | Status | Extra keys                  |
//! |-------------------|--------|-----------------------------|
//! | unknown crop/soil | 400    | `validCrops`, `validSoils`  |
//! | bad input         | 400    |                             |
//! | no dosage rows    | 404    | `availableCrops`            |
//! | anything else     | 500    |                             |

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use tracing::{debug, error};

use crate::resolver::ResolveError;

/// A status code with a JSON body.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: Value,
}

impl ApiError {
    fn message(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({ "error": msg.into() }),
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::message(StatusCode::BAD_REQUEST, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::message(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, body = %self.body, "Request failed");
        } else {
            debug!(status = %self.status, body = %self.body, "Request rejected");
        }
        (self.status, Json(self.body)).into_response()
    }
}

impl From<ResolveError> for ApiError {
    fn from(err: ResolveError) -> Self {
        let msg = err.to_string();
        match err {
            ResolveError::InvalidInput(_) => Self::bad_request(msg),
            ResolveError::UnknownCategory {
                valid_crops,
                valid_soils,
                ..
            } => Self {
                status: StatusCode::BAD_REQUEST,
                body: json!({
                    "error": msg,
                    "validCrops": valid_crops,
                    "validSoils": valid_soils,
                }),
            },
            ResolveError::NoDataForCrop {
                available_crops, ..
            } => Self {
                status: StatusCode::NOT_FOUND,
                body: json!({
                    "error": msg,
                    "availableCrops": available_crops,
                }),
            },
            ResolveError::Internal(_) => Self::internal(msg),
        }
    }
}
