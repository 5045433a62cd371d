//! API Request Handlers

use axum::{
    body::Bytes,
    extract::{RawQuery, State},
    http::{header::CONTENT_TYPE, HeaderMap},
    Json,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

use super::types::*;
use crate::core::pipeline::LookupPipeline;

/// Shared application state
pub struct AppState {
    pub pipeline: LookupPipeline,
}

impl AppState {
    pub fn new(pipeline: LookupPipeline) -> Self {
        Self { pipeline }
    }
}

pub async fn health_check() -> Json<HealthData> {
    Json(HealthData {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Reads `phone` from a JSON or form-encoded body. Numeric JSON values are accepted.
pub fn phone_from_body(headers: &HeaderMap, body: &[u8]) -> Option<String> {
    if body.is_empty() {
        return None;
    }

    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    if content_type.starts_with("application/json") {
        let value: serde_json::Value = serde_json::from_slice(body).ok()?;
        return match value.get("phone")? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        };
    }

    if content_type.starts_with("application/x-www-form-urlencoded") {
        return url::form_urlencoded::parse(body)
            .find(|(key, _)| key == "phone")
            .map(|(_, value)| value.into_owned());
    }

    None
}

/// First `phone` value of a raw query string. Repeated keys are tolerated.
pub fn phone_from_query(raw: Option<&str>) -> Option<String> {
    url::form_urlencoded::parse(raw?.as_bytes())
        .find(|(key, _)| key == "phone")
        .map(|(_, value)| value.into_owned())
}

/// Query parameter wins over the body. Blank values count as missing.
pub fn resolve_phone(query: Option<String>, body: Option<String>) -> Option<String> {
    query
        .filter(|q| !q.is_empty())
        .or(body)
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
}

pub async fn track(
    State(state): State<Arc<AppState>>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<TrackResponse>, ApiFailure> {
    let start = Instant::now();

    let Some(phone) = resolve_phone(phone_from_query(query.as_deref()), phone_from_body(&headers, &body)) else {
        info!("Rejected track request without phone");
        return Err(ApiFailure::MissingPhone);
    };

    match state.pipeline.run(&phone).await {
        Ok(outcome) => {
            debug!("Track '{}' completed", phone);
            info!(
                "📞 Track -> {} records in {:.1}ms",
                outcome.records.len(),
                start.elapsed().as_secs_f64() * 1000.0
            );
            Ok(Json(outcome.into()))
        }
        Err(e) => {
            debug!("Track '{}' failed", phone);
            error!("❌ Track failed: {}", e);
            Err(e.into())
        }
    }
}
