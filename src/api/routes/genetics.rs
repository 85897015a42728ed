//! Genetics Routes
//!
//! AI-backed genetic analysis endpoints. Both are guarded by the in-memory
//! rate limiter and require a configured completion client.
//!
//! - POST /api/v1/genetics/analyze - Free-text analysis of symptoms + data
//! - POST /api/v1/genetics/report - Structured JSON report with SNPedia context

use axum::{extract::State, http::HeaderMap, Json};
use serde_json::Value;
use std::sync::Arc;

use crate::api::dto::{GeneticAnalysisRequest, GeneticAnalysisResponse, GeneticReportRequest};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::genetics;
use crate::upstream::CompletionClient;

/// POST /api/v1/genetics/analyze
///
/// Free-text analysis of genetic data against reported symptoms.
pub async fn analyze_genetics(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<GeneticAnalysisRequest>,
) -> ApiResult<Json<GeneticAnalysisResponse>> {
    if req.symptoms.iter().all(|s| s.trim().is_empty()) {
        return Err(ApiError::Validation("symptoms are required".to_string()));
    }
    let genetic_data = req
        .genetic_data
        .filter(|v| !v.is_null())
        .ok_or_else(|| ApiError::Validation("genetic_data is required".to_string()))?;

    check_rate_limit(&state, &headers)?;
    let completions = completion_client(&state)?;

    let prompt = genetics::analysis_prompt(&req.symptoms, &genetic_data);
    let analysis = completions
        .complete(
            genetics::ANALYST_SYSTEM_PROMPT,
            &prompt,
            genetics::ANALYSIS_TEMPERATURE,
            genetics::ANALYSIS_MAX_TOKENS,
        )
        .await?;

    Ok(Json(GeneticAnalysisResponse { analysis }))
}

/// POST /api/v1/genetics/report
///
/// Structured genetic report. SNP ids are enriched with SNPedia extracts
/// (failed lookups are skipped); the completion must return strict JSON.
pub async fn genetic_report(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<GeneticReportRequest>,
) -> ApiResult<Json<Value>> {
    let symptoms = req
        .symptoms
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::Validation("symptoms are required".to_string()))?;

    check_rate_limit(&state, &headers)?;
    let completions = completion_client(&state)?;

    let mut extracts = Vec::new();
    if let Some(snps) = &req.snps {
        for snp in snps {
            match state.snpedia.fetch_extract(snp).await {
                Ok(extract) => extracts.push(extract),
                Err(e) => {
                    tracing::warn!(snp = %snp, error = %e, "SNPedia lookup failed, skipping");
                }
            }
        }
    }

    let prompt = genetics::report_prompt(symptoms, req.family_history.as_deref(), &extracts);
    let content = completions
        .complete(
            genetics::REPORT_SYSTEM_PROMPT,
            &prompt,
            genetics::ANALYSIS_TEMPERATURE,
            genetics::REPORT_MAX_TOKENS,
        )
        .await?;

    match genetics::parse_report(&content) {
        Ok(report) => Ok(Json(report)),
        Err(e) => {
            tracing::error!(error = %e, raw = %content, "completion returned invalid JSON");
            Err(ApiError::Internal(format!(
                "error parsing AI response: {} (raw response: {})",
                e, content
            )))
        }
    }
}

/// Key the limiter by forwarded client address, one shared bucket otherwise
fn caller_key(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "global".to_string())
}

fn check_rate_limit(state: &AppState, headers: &HeaderMap) -> ApiResult<()> {
    if state.rate_limiter.check(&caller_key(headers)) {
        Ok(())
    } else {
        Err(ApiError::RateLimited(
            "too many analysis requests, try again later".to_string(),
        ))
    }
}

fn completion_client(state: &AppState) -> ApiResult<&Arc<CompletionClient>> {
    state
        .completions
        .as_ref()
        .ok_or_else(|| ApiError::Validation("AI analysis is not configured".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caller_key_from_forwarded_header() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "10.1.2.3, 172.16.0.1".parse().unwrap());
        assert_eq!(caller_key(&headers), "10.1.2.3");
    }

    #[test]
    fn test_caller_key_falls_back_to_global() {
        assert_eq!(caller_key(&HeaderMap::new()), "global");
    }
}
