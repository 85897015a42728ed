//! WHO Global Health Observatory Client
//!
//! Fetches indicator values and the indicator catalogue from the WHO GHO
//! OData API.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use super::retry::{get, get_json, FetchError, RetryPolicy};

/// WHO GHO API client
pub struct WhoGhoClient {
    client: Client,
    config: WhoGhoConfig,
}

/// Configuration for the WHO GHO client
#[derive(Debug, Clone)]
pub struct WhoGhoConfig {
    /// Base URL (e.g., "https://ghoapi.azureedge.net")
    pub base_url: String,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Retry schedule for fetches
    pub retry: RetryPolicy,
}

impl Default for WhoGhoConfig {
    fn default() -> Self {
        Self {
            base_url: "https://ghoapi.azureedge.net".to_string(),
            request_timeout_ms: 10_000,
            retry: RetryPolicy::default(),
        }
    }
}

/// One entry from the GHO indicator catalogue
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GhoIndicator {
    #[serde(rename = "IndicatorCode", default)]
    pub code: Option<String>,
    #[serde(rename = "IndicatorName", default)]
    pub name: Option<String>,
    #[serde(rename = "IndicatorDescription", default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IndicatorCatalogue {
    #[serde(default)]
    value: Vec<GhoIndicator>,
}

impl WhoGhoClient {
    pub fn new(config: WhoGhoConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, config }
    }

    /// Rows for one indicator, narrowed by an OData `$filter` expression
    pub async fn indicator_values(
        &self,
        code: &str,
        filter: &str,
    ) -> Result<Vec<Value>, FetchError> {
        let url = format!(
            "{}/api/{}?$filter={}",
            self.config.base_url,
            urlencoding::encode(code),
            urlencoding::encode(filter)
        );

        tracing::debug!(%url, "fetching GHO indicator values");
        let body = get_json(&self.client, &url, &self.config.retry).await?;

        match body.get("value").and_then(Value::as_array) {
            Some(rows) => Ok(rows.clone()),
            None => Err(FetchError::Decode(
                "missing `value` array in GHO response".to_string(),
            )),
        }
    }

    /// The full indicator catalogue
    pub async fn list_indicators(&self) -> Result<Vec<GhoIndicator>, FetchError> {
        let url = format!("{}/api/Indicator", self.config.base_url);

        tracing::debug!(%url, "fetching GHO indicator catalogue");
        let catalogue: IndicatorCatalogue = get(&self.client, &url, &self.config.retry).await?;
        Ok(catalogue.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = WhoGhoConfig::default();
        assert_eq!(config.base_url, "https://ghoapi.azureedge.net");
        assert_eq!(config.retry.max_retries, 3);
    }

    #[test]
    fn test_indicator_deserializes_with_missing_fields() {
        let indicator: GhoIndicator = serde_json::from_value(serde_json::json!({
            "IndicatorCode": "WHS4_543"
        }))
        .unwrap();
        assert_eq!(indicator.code.as_deref(), Some("WHS4_543"));
        assert!(indicator.name.is_none());
        assert!(indicator.description.is_none());
    }
}
