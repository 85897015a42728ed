//! Trial Routes
//!
//! Clinical trial discovery endpoints.
//!
//! - GET /api/v1/trials/search - Search studies by condition
//! - GET /api/v1/trials/:id - Full study detail

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::Value;
use std::sync::Arc;

use crate::api::dto::{TrialSearchParams, TrialSearchResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::trials::{self, TrialDetail};
use crate::upstream::FetchError;

/// GET /api/v1/trials/search
///
/// Search ClinicalTrials.gov by condition, optionally narrowed by location
/// and overall status. Studies without an NCT id are dropped.
pub async fn search_trials(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TrialSearchParams>,
) -> ApiResult<Json<TrialSearchResponse>> {
    let condition = params
        .condition
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::Validation("condition is required".to_string()))?;

    let body = state
        .trials
        .search(condition, params.location.as_deref(), params.status.as_deref())
        .await?;

    let studies = body.get("studies").and_then(Value::as_array).ok_or_else(|| {
        ApiError::Upstream("invalid response format from ClinicalTrials.gov".to_string())
    })?;

    let summaries: Vec<_> = studies.iter().filter_map(trials::summarize_study).collect();

    tracing::debug!(condition, returned = summaries.len(), "trial search complete");

    Ok(Json(TrialSearchResponse {
        total_count: body
            .get("totalCount")
            .and_then(Value::as_u64)
            .unwrap_or(summaries.len() as u64),
        next_page_token: body
            .get("nextPageToken")
            .and_then(Value::as_str)
            .map(String::from),
        studies: summaries,
    }))
}

/// GET /api/v1/trials/:id
///
/// Fetch full detail for one study. An unknown id is a 404.
pub async fn get_trial(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<TrialDetail>> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ApiError::Validation("trial id is required".to_string()));
    }

    let study = state.trials.get_study(id).await.map_err(|e| match e {
        FetchError::NotFound => ApiError::NotFound(format!("trial {} not found", id)),
        other => other.into(),
    })?;

    let detail = trials::detail_from_study(&study)
        .ok_or_else(|| ApiError::Internal("invalid trial data received".to_string()))?;

    Ok(Json(detail))
}
