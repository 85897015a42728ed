//! HealthBench Route
//!
//! - POST /api/v1/healthbench - Rank candidate trials for a patient profile

use axum::{extract::State, Json};
use chrono::Utc;
use std::sync::Arc;

use crate::api::dto::HealthBenchRequest;
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::healthbench::{self, EvaluationReport};

/// POST /api/v1/healthbench
///
/// Evaluate candidate trials against a patient profile via the completion
/// endpoint and return the normalized evaluation.
pub async fn evaluate_trials(
    State(state): State<Arc<AppState>>,
    Json(req): Json<HealthBenchRequest>,
) -> ApiResult<Json<EvaluationReport>> {
    let user_profile = req
        .user_profile
        .filter(|v| !v.is_null())
        .ok_or_else(|| ApiError::Validation("user_profile and trials are required".to_string()))?;
    let trials = req
        .trials
        .ok_or_else(|| ApiError::Validation("user_profile and trials are required".to_string()))?;

    let completions = state
        .completions
        .as_ref()
        .ok_or_else(|| ApiError::Validation("AI analysis is not configured".to_string()))?;

    let prompt = healthbench::evaluation_prompt(&user_profile, &trials);
    let content = completions
        .complete(
            healthbench::SYSTEM_PROMPT,
            &prompt,
            healthbench::EVALUATION_TEMPERATURE,
            healthbench::EVALUATION_MAX_TOKENS,
        )
        .await?;

    let raw: serde_json::Value = serde_json::from_str(content.trim()).map_err(|e| {
        tracing::error!(error = %e, raw = %content, "evaluation returned invalid JSON");
        ApiError::Internal(format!("error parsing evaluation response: {}", e))
    })?;

    tracing::debug!(trials = trials.len(), "trial evaluation complete");
    Ok(Json(healthbench::normalize_report(&raw, Utc::now())))
}
