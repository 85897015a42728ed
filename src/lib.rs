//! # Trialscope
//!
//! Health data proxy API - a stateless HTTP service for clinical trial
//! discovery, vaccine coverage maps, outbreak tracking, and AI-assisted
//! genetic analysis.
//!
//! Every data endpoint follows the same proxy pattern: validate the request,
//! fetch from a public upstream (ClinicalTrials.gov, WHO GHO, SNPedia, an
//! OpenAI-compatible completion endpoint), reshape the JSON for the front
//! end, respond. Map-facing routes emit GeoJSON.
//!
//! ## Modules
//!
//! - [`upstream`]: Upstream clients, retry-with-backoff fetch helpers, and
//!   the in-memory rate limiter
//! - [`trials`], [`vaccines`], [`outbreaks`]: Reshaping of upstream JSON
//! - [`genetics`], [`healthbench`]: Prompt assembly and completion handling
//! - [`geo`]: GeoJSON shapes and country tables
//! - [`api`]: REST API server with Axum
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use trialscope::api::{serve, ApiConfig, AppState};
//! use trialscope::upstream::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let state = AppState::new(
//!         Arc::new(ClinicalTrialsClient::new(ClinicalTrialsConfig::default())),
//!         Arc::new(WhoGhoClient::new(WhoGhoConfig::default())),
//!         Arc::new(SnpediaClient::new(SnpediaConfig::default())),
//!         None, // AI analysis disabled without an API key
//!         Arc::new(RateLimiter::new(RateLimitConfig::default())),
//!         ApiConfig::default(),
//!     );
//!
//!     serve(state, &ApiConfig::default()).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod genetics;
pub mod geo;
pub mod healthbench;
pub mod outbreaks;
pub mod trials;
pub mod upstream;
pub mod vaccines;

// Re-export top-level types for convenience
pub use api::{build_router, serve, ApiError, AppState};

pub use upstream::{
    ClinicalTrialsClient, ClinicalTrialsConfig, CompletionClient, CompletionConfig,
    CompletionError, FetchError, GhoIndicator, RateLimitConfig, RateLimiter, RetryPolicy,
    SnpExtract, SnpediaClient, SnpediaConfig, WhoGhoClient, WhoGhoConfig,
};

pub use geo::{Feature, FeatureCollection, Geometry};

pub use config::{
    Config, ConfigError, ApiConfig as ConfigApiConfig, LoggingConfig, OpenAiConfig,
    RateLimitSettings, UpstreamConfig,
};
