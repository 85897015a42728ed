//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

use crate::outbreaks;
use crate::upstream::{
    ClinicalTrialsClient, CompletionClient, RateLimiter, SnpediaClient, WhoGhoClient,
};

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// ClinicalTrials.gov client
    pub trials: Arc<ClinicalTrialsClient>,
    /// WHO Global Health Observatory client
    pub gho: Arc<WhoGhoClient>,
    /// SNPedia client
    pub snpedia: Arc<SnpediaClient>,
    /// Completion client for AI analysis (None when no API key is configured)
    pub completions: Option<Arc<CompletionClient>>,
    /// Request-count limiter for the AI routes
    pub rate_limiter: Arc<RateLimiter>,
    /// Disease → GHO indicator code; rebuilt by the refresh flag on /outbreaks
    pub disease_indicators: Arc<RwLock<HashMap<String, String>>>,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        trials: Arc<ClinicalTrialsClient>,
        gho: Arc<WhoGhoClient>,
        snpedia: Arc<SnpediaClient>,
        completions: Option<Arc<CompletionClient>>,
        rate_limiter: Arc<RateLimiter>,
        config: ApiConfig,
    ) -> Self {
        Self {
            trials,
            gho,
            snpedia,
            completions,
            rate_limiter,
            disease_indicators: Arc::new(RwLock::new(outbreaks::default_indicators())),
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Check if AI analysis is available
    pub fn has_completions(&self) -> bool {
        self.completions.is_some()
    }
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Maximum request body size in bytes
    pub max_body_size: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8090,
            request_timeout_ms: 30_000,
            max_body_size: 1024 * 1024, // 1MB
        }
    }
}

impl ApiConfig {
    /// Create config with custom host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
