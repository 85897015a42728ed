//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub upstream: UpstreamConfig,

    #[serde(default)]
    pub openai: OpenAiConfig,

    #[serde(default)]
    pub rate_limit: RateLimitSettings,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub cors_origins: Vec<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8090
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Upstream health API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_clinical_trials_url")]
    pub clinical_trials_url: String,

    #[serde(default = "default_who_gho_url")]
    pub who_gho_url: String,

    #[serde(default = "default_snpedia_url")]
    pub snpedia_url: String,

    #[serde(default = "default_upstream_timeout")]
    pub request_timeout_ms: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_backoff_base")]
    pub backoff_base_ms: u64,

    #[serde(default = "default_backoff_cap")]
    pub backoff_cap_ms: u64,
}

fn default_clinical_trials_url() -> String {
    "https://clinicaltrials.gov".to_string()
}

fn default_who_gho_url() -> String {
    "https://ghoapi.azureedge.net".to_string()
}

fn default_snpedia_url() -> String {
    "https://bots.snpedia.com".to_string()
}

fn default_upstream_timeout() -> u64 {
    10_000
}

fn default_max_retries() -> u32 {
    3
}

fn default_backoff_base() -> u64 {
    1000
}

fn default_backoff_cap() -> u64 {
    3000
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            clinical_trials_url: default_clinical_trials_url(),
            who_gho_url: default_who_gho_url(),
            snpedia_url: default_snpedia_url(),
            request_timeout_ms: default_upstream_timeout(),
            max_retries: default_max_retries(),
            backoff_base_ms: default_backoff_base(),
            backoff_cap_ms: default_backoff_cap(),
        }
    }
}

/// Completion service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiConfig {
    #[serde(default = "default_openai_url")]
    pub url: String,

    /// API key; the OPENAI_API_KEY environment variable takes precedence
    pub api_key: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_openai_timeout")]
    pub request_timeout_ms: u64,

    #[serde(default = "default_openai_enabled")]
    pub enabled: bool,
}

fn default_openai_url() -> String {
    "https://api.openai.com".to_string()
}

fn default_model() -> String {
    "gpt-4".to_string()
}

fn default_openai_timeout() -> u64 {
    30_000
}

fn default_openai_enabled() -> bool {
    true
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            url: default_openai_url(),
            api_key: None,
            model: default_model(),
            request_timeout_ms: default_openai_timeout(),
            enabled: default_openai_enabled(),
        }
    }
}

impl OpenAiConfig {
    /// Effective API key: environment first, then the config file
    pub fn resolved_api_key(&self) -> Option<String> {
        std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .or_else(|| self.api_key.clone().filter(|k| !k.is_empty()))
    }
}

/// Rate limiter configuration for the AI routes
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitSettings {
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

fn default_max_requests() -> u32 {
    10
}

fn default_window_secs() -> u64 {
    60
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            max_requests: default_max_requests(),
            window_secs: default_window_secs(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,

    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        // Try default config locations
        let config_paths = [
            dirs::config_dir().map(|p| p.join("trialscope").join("config.toml")),
            Some(PathBuf::from("/etc/trialscope/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        // Fall back to environment-only config
        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        // API overrides
        if let Ok(host) = std::env::var("TRIALSCOPE_API_HOST") {
            self.api.host = host;
        }
        if let Ok(port) = std::env::var("TRIALSCOPE_API_PORT") {
            if let Ok(p) = port.parse() {
                self.api.port = p;
            }
        }

        // Upstream overrides
        if let Ok(url) = std::env::var("TRIALSCOPE_CLINICAL_TRIALS_URL") {
            self.upstream.clinical_trials_url = url;
        }
        if let Ok(url) = std::env::var("TRIALSCOPE_WHO_GHO_URL") {
            self.upstream.who_gho_url = url;
        }
        if let Ok(url) = std::env::var("TRIALSCOPE_SNPEDIA_URL") {
            self.upstream.snpedia_url = url;
        }

        // Completion service overrides
        if let Ok(url) = std::env::var("TRIALSCOPE_OPENAI_URL") {
            self.openai.url = url;
        }
        if let Ok(model) = std::env::var("TRIALSCOPE_OPENAI_MODEL") {
            self.openai.model = model;
        }

        // Logging overrides
        if let Ok(level) = std::env::var("TRIALSCOPE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("TRIALSCOPE_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Trialscope Configuration
#
# Environment variables override these settings:
# - TRIALSCOPE_API_HOST
# - TRIALSCOPE_API_PORT
# - TRIALSCOPE_CLINICAL_TRIALS_URL
# - TRIALSCOPE_WHO_GHO_URL
# - TRIALSCOPE_SNPEDIA_URL
# - TRIALSCOPE_OPENAI_URL
# - TRIALSCOPE_OPENAI_MODEL
# - TRIALSCOPE_LOG_LEVEL
# - TRIALSCOPE_LOG_FORMAT
# - OPENAI_API_KEY

[api]
# API server host
host = "0.0.0.0"

# API server port
port = 8090

# Allowed CORS origins
cors_origins = ["http://localhost:3000", "http://127.0.0.1:3000"]

# Request timeout in seconds
request_timeout_secs = 30

[upstream]
# ClinicalTrials.gov base URL
clinical_trials_url = "https://clinicaltrials.gov"

# WHO Global Health Observatory base URL
who_gho_url = "https://ghoapi.azureedge.net"

# SNPedia base URL
snpedia_url = "https://bots.snpedia.com"

# Upstream request timeout (ms)
request_timeout_ms = 10000

# Fetch attempts before giving up
max_retries = 3

# First backoff delay (ms)
backoff_base_ms = 1000

# Backoff delay cap (ms)
backoff_cap_ms = 3000

[openai]
# Completion endpoint base URL
url = "https://api.openai.com"

# Model for analysis requests
model = "gpt-4"

# Completion request timeout (ms)
request_timeout_ms = 30000

# Enable AI analysis routes (also requires an API key)
enabled = true

# API key (prefer the OPENAI_API_KEY environment variable)
# api_key = ""

[rate_limit]
# Analysis requests allowed per caller per window
max_requests = 10

# Window length (seconds)
window_secs = 60

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"

# Optional log file path
# file = "/var/log/trialscope/trialscope.log"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.port, 8090);
        assert_eq!(config.upstream.max_retries, 3);
        assert_eq!(config.openai.model, "gpt-4");
        assert_eq!(config.rate_limit.max_requests, 10);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "[api]\nport = 9999\n\n[upstream]\nmax_retries = 5\n"
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.api.port, 9999);
        assert_eq!(config.upstream.max_retries, 5);
        // untouched sections keep their defaults
        assert_eq!(config.api.host, "0.0.0.0");
        assert_eq!(config.upstream.backoff_cap_ms, 3000);
    }

    #[test]
    fn test_generated_default_parses() {
        let config: Config = toml::from_str(&generate_default_config()).unwrap();
        assert_eq!(config.api.port, 8090);
        assert!(config.openai.enabled);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
