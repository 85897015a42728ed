//! Vaccine Coverage Route
//!
//! - GET /api/v1/coverage - Coverage GeoJSON for one vaccine and year

use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

use crate::api::dto::CoverageParams;
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::geo::FeatureCollection;
use crate::vaccines::{self, CoverageProperties};

/// GET /api/v1/coverage
///
/// WHO coverage rows for a supported vaccine in a given year, reshaped into
/// a GeoJSON FeatureCollection keyed by ISO-3 country code.
pub async fn vaccine_coverage(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CoverageParams>,
) -> ApiResult<Json<FeatureCollection<CoverageProperties>>> {
    let (vaccine, year) = match (
        params.vaccine.as_deref().map(str::trim).filter(|v| !v.is_empty()),
        params.year.as_deref().map(str::trim).filter(|y| !y.is_empty()),
    ) {
        (Some(vaccine), Some(year)) => (vaccine, year),
        _ => {
            return Err(ApiError::Validation(
                "vaccine and year are required".to_string(),
            ))
        }
    };

    let info = vaccines::vaccine_indicator(vaccine).ok_or_else(|| {
        ApiError::Validation(format!(
            "invalid vaccine selected: {} (available: {})",
            vaccine,
            vaccines::vaccine_keys().join(", ")
        ))
    })?;

    let filter = format!("TimeDim eq {year}");
    let rows = state.gho.indicator_values(info.code, &filter).await?;

    let features = vaccines::coverage_features(&rows, vaccine, info);
    tracing::debug!(
        vaccine,
        year,
        rows = rows.len(),
        features = features.len(),
        "coverage reshape complete"
    );

    Ok(Json(FeatureCollection::new(features)))
}
