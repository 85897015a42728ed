//! Outbreak Routes
//!
//! - GET /api/v1/outbreaks - Active outbreak GeoJSON for one disease

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use std::sync::Arc;

use crate::api::dto::{IndicatorRefreshResponse, OutbreakParams};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::geo::FeatureCollection;
use crate::outbreaks::{self, Outbreak, Severity, TimePeriod};
use crate::upstream::FetchError;

/// GET /api/v1/outbreaks
///
/// WHO case counts for one disease over a reporting window, reshaped into
/// outbreak GeoJSON with severity tiers and response recommendations.
///
/// `refresh=true` re-fetches the GHO indicator catalogue and rebuilds the
/// disease map first; without a `disease` it answers with the rebuilt map.
/// A refresh failure keeps the existing map.
pub async fn outbreaks(
    State(state): State<Arc<AppState>>,
    Query(params): Query<OutbreakParams>,
) -> ApiResult<Response> {
    if params.refresh.as_deref() == Some("true") {
        match state.gho.list_indicators().await {
            Ok(catalogue) => {
                let mapped = outbreaks::indicators_from_catalogue(&catalogue);
                if !mapped.is_empty() {
                    let mut indicators = state.disease_indicators.write().await;
                    *indicators = mapped;
                    tracing::info!(diseases = indicators.len(), "disease indicator map refreshed");
                }
                if params.disease.is_none() {
                    let indicators = state.disease_indicators.read().await;
                    return Ok(Json(IndicatorRefreshResponse {
                        message: "available disease indicators".to_string(),
                        indicators: indicators.clone(),
                    })
                    .into_response());
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "indicator refresh failed, keeping existing map");
            }
        }
    }

    let disease = params
        .disease
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .ok_or_else(|| ApiError::Validation("disease type is required".to_string()))?;

    let indicator = {
        let indicators = state.disease_indicators.read().await;
        match indicators.get(disease) {
            Some(code) => code.clone(),
            None => {
                let mut available: Vec<_> = indicators.keys().cloned().collect();
                available.sort();
                return Err(ApiError::Validation(format!(
                    "invalid disease type '{}' (available: {})",
                    disease,
                    available.join(", ")
                )));
            }
        }
    };

    let severity_filter = match params.severity.as_deref() {
        None | Some("all") => None,
        Some(s) => Some(Severity::parse(s).ok_or_else(|| {
            ApiError::Validation(format!(
                "invalid severity '{}' (use high, moderate, low, or all)",
                s
            ))
        })?),
    };

    let period = TimePeriod::parse(params.time_period.as_deref());
    let filter = outbreaks::time_filter(period, Utc::now());

    let rows = state
        .gho
        .indicator_values(&indicator, &filter)
        .await
        .map_err(|e| match e {
            FetchError::NotFound => ApiError::NotFound(format!(
                "disease data not available from WHO for '{}'",
                disease
            )),
            other => other.into(),
        })?;

    let found = outbreaks::outbreaks_from_rows(&rows, disease, severity_filter);
    if found.is_empty() {
        return Err(ApiError::NotFound(format!(
            "no outbreak data available for disease '{}' over {}",
            disease,
            period.as_str()
        )));
    }

    tracing::debug!(
        disease,
        indicator = %indicator,
        period = period.as_str(),
        outbreaks = found.len(),
        "outbreak reshape complete"
    );

    let features: Vec<_> = found.into_iter().map(Outbreak::into_feature).collect();
    Ok(Json(FeatureCollection::new(features)).into_response())
}
