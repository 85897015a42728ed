//! Vaccine Data Route
//!
//! - GET /api/v1/vaccine-data - Indicator catalogue, or GeoJSON values for
//!   one indicator

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::api::dto::{IndicatorListResponse, VaccineDataParams};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::geo::FeatureCollection;
use crate::vaccines;

/// Pinned upper bound for `year=latest`; GHO publishes annual series with a lag
const LATEST_YEAR_FILTER: &str = "TimeDim le 2023";

/// GET /api/v1/vaccine-data
///
/// Without an `indicator` parameter, lists vaccine-related indicators from
/// the GHO catalogue. With one, returns that indicator's values as GeoJSON;
/// rows without a usable numeric value are dropped.
pub async fn vaccine_data(
    State(state): State<Arc<AppState>>,
    Query(params): Query<VaccineDataParams>,
) -> ApiResult<Response> {
    let Some(indicator) = params
        .indicator
        .as_deref()
        .map(str::trim)
        .filter(|i| !i.is_empty())
    else {
        let catalogue = state.gho.list_indicators().await?;
        let indicators = vaccines::vaccine_related_indicators(&catalogue);
        tracing::debug!(
            catalogue = catalogue.len(),
            filtered = indicators.len(),
            "indicator list complete"
        );
        return Ok(Json(IndicatorListResponse { indicators }).into_response());
    };

    let time_filter = if params.year == "latest" {
        LATEST_YEAR_FILTER.to_string()
    } else {
        format!("TimeDim eq {}", params.year)
    };

    let rows = state.gho.indicator_values(indicator, &time_filter).await?;
    if rows.is_empty() {
        return Err(ApiError::NotFound(format!(
            "no data available for indicator '{}' with filter '{}'",
            indicator, time_filter
        )));
    }

    let features = vaccines::indicator_value_features(&rows, indicator);
    if features.is_empty() {
        return Err(ApiError::NotFound(format!(
            "no valid data points found after processing indicator '{}'",
            indicator
        )));
    }

    Ok(Json(FeatureCollection::new(features)).into_response())
}
