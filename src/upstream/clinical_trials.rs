//! ClinicalTrials.gov API Client
//!
//! Fetches study records from the ClinicalTrials.gov v2 REST API.

use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use super::retry::{get_json, FetchError, RetryPolicy};

/// Fields requested from the studies search endpoint
const SEARCH_FIELDS: &str = "BriefTitle,NCTId,OverallStatus,LocationFacility,BriefSummary,\
Condition,StudyType,Phase,EnrollmentCount,StartDate,CompletionDate";

/// Overall statuses accepted by the search filter; anything else is ignored
pub const OVERALL_STATUSES: [&str; 7] = [
    "RECRUITING",
    "NOT_YET_RECRUITING",
    "ACTIVE_NOT_RECRUITING",
    "COMPLETED",
    "TERMINATED",
    "WITHDRAWN",
    "SUSPENDED",
];

/// ClinicalTrials.gov API client
pub struct ClinicalTrialsClient {
    client: Client,
    config: ClinicalTrialsConfig,
}

/// Configuration for the ClinicalTrials.gov client
#[derive(Debug, Clone)]
pub struct ClinicalTrialsConfig {
    /// Base URL (e.g., "https://clinicaltrials.gov")
    pub base_url: String,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Retry schedule for fetches
    pub retry: RetryPolicy,
    /// Search result page size
    pub page_size: u32,
}

impl Default for ClinicalTrialsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://clinicaltrials.gov".to_string(),
            request_timeout_ms: 10_000,
            retry: RetryPolicy::default(),
            page_size: 10,
        }
    }
}

impl ClinicalTrialsClient {
    pub fn new(config: ClinicalTrialsConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, config }
    }

    /// Search studies by condition, optionally narrowed by location and
    /// overall status
    pub async fn search(
        &self,
        condition: &str,
        location: Option<&str>,
        status: Option<&str>,
    ) -> Result<Value, FetchError> {
        let mut url = format!(
            "{}/api/v2/studies?query.cond={}&fields={}&pageSize={}",
            self.config.base_url,
            urlencoding::encode(condition),
            SEARCH_FIELDS,
            self.config.page_size,
        );

        if let Some(location) = location.map(str::trim).filter(|l| !l.is_empty()) {
            url.push_str("&query.locn=");
            url.push_str(&urlencoding::encode(location));
        }

        if let Some(status) = status {
            if OVERALL_STATUSES.contains(&status) {
                url.push_str("&filter.overallStatus=");
                url.push_str(&urlencoding::encode(status));
            }
        }

        tracing::debug!(%url, "searching clinical trials");
        get_json(&self.client, &url, &self.config.retry).await
    }

    /// Fetch a single study by NCT id; an unknown id is `FetchError::NotFound`
    pub async fn get_study(&self, id: &str) -> Result<Value, FetchError> {
        let url = format!(
            "{}/api/v2/studies/{}",
            self.config.base_url,
            urlencoding::encode(id)
        );

        tracing::debug!(%url, "fetching study detail");
        get_json(&self.client, &url, &self.config.retry).await
    }
}
