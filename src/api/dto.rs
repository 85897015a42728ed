//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::trials::TrialSummary;
use crate::vaccines::IndicatorSummary;

// ============================================
// TRIAL DTOs
// ============================================

/// Trial search query parameters
#[derive(Debug, Deserialize)]
pub struct TrialSearchParams {
    /// Condition to search for (required)
    #[serde(default)]
    pub condition: Option<String>,
    /// Optional location filter
    #[serde(default)]
    pub location: Option<String>,
    /// Optional overall-status filter
    #[serde(default)]
    pub status: Option<String>,
}

/// Trial search response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialSearchResponse {
    /// Reshaped studies
    pub studies: Vec<TrialSummary>,
    /// Upstream total match count
    pub total_count: u64,
    /// Upstream pagination token, passed through
    pub next_page_token: Option<String>,
}

// ============================================
// COVERAGE / VACCINE-DATA DTOs
// ============================================

/// Vaccine coverage query parameters
#[derive(Debug, Deserialize)]
pub struct CoverageParams {
    #[serde(default)]
    pub vaccine: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
}

/// Vaccine-data query parameters
#[derive(Debug, Deserialize)]
pub struct VaccineDataParams {
    /// GHO indicator code; omit to list vaccine-related indicators
    #[serde(default)]
    pub indicator: Option<String>,
    /// Year to filter on, or "latest"
    #[serde(default = "default_year")]
    pub year: String,
}

fn default_year() -> String {
    "latest".to_string()
}

/// Indicator catalogue response (vaccine-data list mode)
#[derive(Debug, Serialize)]
pub struct IndicatorListResponse {
    pub indicators: Vec<IndicatorSummary>,
}

// ============================================
// OUTBREAK DTOs
// ============================================

/// Outbreak query parameters
#[derive(Debug, Deserialize)]
pub struct OutbreakParams {
    #[serde(default)]
    pub disease: Option<String>,
    /// Reporting window: 7d, 30d, 90d, 1y (default 30d)
    #[serde(default)]
    pub time_period: Option<String>,
    /// Severity filter: high, moderate, low, all
    #[serde(default)]
    pub severity: Option<String>,
    /// "true" re-fetches the indicator catalogue before answering
    #[serde(default)]
    pub refresh: Option<String>,
}

/// Response for a refresh request without a disease
#[derive(Debug, Serialize)]
pub struct IndicatorRefreshResponse {
    pub message: String,
    /// Disease → GHO indicator code currently in effect
    pub indicators: HashMap<String, String>,
}

// ============================================
// GENETICS DTOs
// ============================================

/// Free-text genetic analysis request
#[derive(Debug, Deserialize)]
pub struct GeneticAnalysisRequest {
    /// Reported symptoms
    #[serde(default)]
    pub symptoms: Vec<String>,
    /// Raw genetic data to analyze
    #[serde(default)]
    pub genetic_data: Option<Value>,
}

/// Free-text genetic analysis response
#[derive(Debug, Serialize)]
pub struct GeneticAnalysisResponse {
    pub analysis: String,
}

/// Structured genetic report request
#[derive(Debug, Deserialize)]
pub struct GeneticReportRequest {
    /// Symptom description (required)
    #[serde(default)]
    pub symptoms: Option<String>,
    /// Optional family history
    #[serde(default)]
    pub family_history: Option<String>,
    /// Optional SNP ids to enrich from SNPedia
    #[serde(default)]
    pub snps: Option<Vec<String>>,
}

// ============================================
// HEALTHBENCH DTOs
// ============================================

/// Trial evaluation request
#[derive(Debug, Deserialize)]
pub struct HealthBenchRequest {
    /// Patient profile (required)
    #[serde(default)]
    pub user_profile: Option<Value>,
    /// Candidate trials (required)
    #[serde(default)]
    pub trials: Option<Vec<Value>>,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Full health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status: healthy
    pub status: String,
    /// AI analysis availability: enabled or disabled
    pub ai_analysis: String,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Application version
    pub version: String,
}
