//! Trialscope API Server
//!
//! Run with: cargo run --bin trialscope-api
//!
//! # Configuration
//!
//! Loaded from config.toml (see `trialscope-cli config`) with environment
//! overrides:
//! - `TRIALSCOPE_API_HOST`: Host to bind to (default: 0.0.0.0)
//! - `TRIALSCOPE_API_PORT`: Port to listen on (default: 8090)
//! - `TRIALSCOPE_CLINICAL_TRIALS_URL` / `TRIALSCOPE_WHO_GHO_URL` /
//!   `TRIALSCOPE_SNPEDIA_URL` / `TRIALSCOPE_OPENAI_URL`: Upstream base URLs
//! - `OPENAI_API_KEY`: Completion API key (enables the AI analysis routes)
//! - `RUST_LOG`: Log filter (default: trialscope=info,tower_http=debug)

use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trialscope::api::{serve, ApiConfig, AppState};
use trialscope::config::Config;
use trialscope::upstream::{
    ClinicalTrialsClient, ClinicalTrialsConfig, CompletionClient, CompletionConfig,
    RateLimitConfig, RateLimiter, RetryPolicy, SnpediaClient, SnpediaConfig, WhoGhoClient,
    WhoGhoConfig,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load_default();

    init_tracing(&config);

    tracing::info!("Starting Trialscope API server v{}", env!("CARGO_PKG_VERSION"));

    let retry = RetryPolicy {
        max_retries: config.upstream.max_retries,
        base_delay: Duration::from_millis(config.upstream.backoff_base_ms),
        max_delay: Duration::from_millis(config.upstream.backoff_cap_ms),
    };

    let trials = Arc::new(ClinicalTrialsClient::new(ClinicalTrialsConfig {
        base_url: config.upstream.clinical_trials_url.clone(),
        request_timeout_ms: config.upstream.request_timeout_ms,
        retry: retry.clone(),
        ..Default::default()
    }));

    let gho = Arc::new(WhoGhoClient::new(WhoGhoConfig {
        base_url: config.upstream.who_gho_url.clone(),
        request_timeout_ms: config.upstream.request_timeout_ms,
        retry: retry.clone(),
    }));

    let snpedia = Arc::new(SnpediaClient::new(SnpediaConfig {
        base_url: config.upstream.snpedia_url.clone(),
        request_timeout_ms: config.upstream.request_timeout_ms,
        retry: retry.clone(),
    }));

    let completions = match (config.openai.enabled, config.openai.resolved_api_key()) {
        (true, Some(api_key)) => {
            tracing::info!(
                model = %config.openai.model,
                "AI analysis enabled via {}",
                config.openai.url
            );
            Some(Arc::new(CompletionClient::new(CompletionConfig {
                base_url: config.openai.url.clone(),
                api_key,
                model: config.openai.model.clone(),
                request_timeout_ms: config.openai.request_timeout_ms,
                retry,
            })))
        }
        _ => {
            tracing::info!("AI analysis disabled (set OPENAI_API_KEY to enable)");
            None
        }
    };

    let rate_limiter = Arc::new(RateLimiter::new(RateLimitConfig {
        max_requests: config.rate_limit.max_requests,
        window: Duration::from_secs(config.rate_limit.window_secs),
    }));

    let api_config = ApiConfig {
        host: config.api.host.clone(),
        port: config.api.port,
        request_timeout_ms: config.api.request_timeout_secs * 1000,
        ..Default::default()
    };

    let state = AppState::new(trials, gho, snpedia, completions, rate_limiter, api_config.clone());

    tracing::info!("Starting server on {}", api_config.addr());
    serve(state, &api_config).await?;

    tracing::info!("Trialscope API server stopped");
    Ok(())
}

/// Initialize tracing from the logging config; RUST_LOG wins when set
fn init_tracing(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("trialscope={},tower_http=debug", config.logging.level).into()
    });

    if config.logging.format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
