//! Request and response bodies of the HTTP API.

use crate::domain::model::{LookupOutcome, Record};
use crate::utils::error::LookupError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

pub const MISSING_PHONE_MESSAGE: &str =
    "phone parameter required. Example: /api/track?phone=03027665767";

#[derive(Debug, Serialize)]
pub struct TrackResponse {
    pub success: bool,
    pub phone: String,
    pub records: Vec<Record>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl From<LookupOutcome> for TrackResponse {
    fn from(outcome: LookupOutcome) -> Self {
        Self {
            success: true,
            phone: outcome.phone,
            records: outcome.records,
            warnings: outcome.warnings,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthData {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct BadRequestBody {
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureBody {
    pub success: bool,
    pub error: String,
    pub details: String,
    pub status_code: Option<u16>,
}

/// Error responses of the track endpoint.
#[derive(Debug)]
pub enum ApiFailure {
    MissingPhone,
    Lookup(LookupError),
}

impl From<LookupError> for ApiFailure {
    fn from(error: LookupError) -> Self {
        match error {
            LookupError::ValidationError { .. } => ApiFailure::MissingPhone,
            other => ApiFailure::Lookup(other),
        }
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        match self {
            ApiFailure::MissingPhone => (
                StatusCode::BAD_REQUEST,
                Json(BadRequestBody {
                    error: MISSING_PHONE_MESSAGE.to_string(),
                }),
            )
                .into_response(),
            ApiFailure::Lookup(error) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(FailureBody {
                    success: false,
                    error: "Request failed".to_string(),
                    status_code: error.upstream_status(),
                    details: match error {
                        LookupError::UpstreamError { message, .. } => message,
                        other => other.to_string(),
                    },
                }),
            )
                .into_response(),
        }
    }
}
