//! SNPedia Client
//!
//! Fetches SNP page extracts from the SNPedia MediaWiki API. Used to enrich
//! genetic-analysis prompts; a failed lookup for one SNP is not fatal to the
//! overall request.

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use super::retry::{get_json, FetchError, RetryPolicy};

/// SNPedia MediaWiki client
pub struct SnpediaClient {
    client: Client,
    config: SnpediaConfig,
}

/// Configuration for the SNPedia client
#[derive(Debug, Clone)]
pub struct SnpediaConfig {
    /// Base URL (e.g., "https://bots.snpedia.com")
    pub base_url: String,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Retry schedule for fetches
    pub retry: RetryPolicy,
}

impl Default for SnpediaConfig {
    fn default() -> Self {
        Self {
            base_url: "https://bots.snpedia.com".to_string(),
            request_timeout_ms: 10_000,
            retry: RetryPolicy::default(),
        }
    }
}

/// Extract text for one SNP page; `extract` is None when the page is
/// missing or has no extract
#[derive(Debug, Clone, Serialize)]
pub struct SnpExtract {
    pub snp: String,
    pub extract: Option<String>,
}

impl SnpediaClient {
    pub fn new(config: SnpediaConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, config }
    }

    /// Fetch the page extract for one SNP
    pub async fn fetch_extract(&self, snp: &str) -> Result<SnpExtract, FetchError> {
        let url = format!(
            "{}/api.php?action=query&titles={}&prop=extracts&format=json",
            self.config.base_url,
            urlencoding::encode(snp)
        );

        tracing::debug!(%url, "fetching SNPedia extract");
        let body = get_json(&self.client, &url, &self.config.retry).await?;

        Ok(SnpExtract {
            snp: snp.to_string(),
            extract: first_page_extract(&body),
        })
    }
}

/// MediaWiki keys its `pages` object by numeric page id; take the first page
fn first_page_extract(body: &Value) -> Option<String> {
    body.pointer("/query/pages")?
        .as_object()?
        .values()
        .next()?
        .get("extract")?
        .as_str()
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_from_pages_object() {
        let body = json!({
            "query": {
                "pages": {
                    "12345": { "pageid": 12345, "title": "Rs53576", "extract": "A well-studied SNP." }
                }
            }
        });
        assert_eq!(
            first_page_extract(&body).as_deref(),
            Some("A well-studied SNP.")
        );
    }

    #[test]
    fn test_missing_page_yields_none() {
        assert!(first_page_extract(&json!({})).is_none());
        assert!(first_page_extract(&json!({"query": {"pages": {}}})).is_none());
        assert!(first_page_extract(&json!({
            "query": { "pages": { "-1": { "missing": "" } } }
        }))
        .is_none());
    }
}
