//! Upstream API Access
//!
//! Clients for the public APIs this service proxies:
//! - ClinicalTrials.gov v2 (study search and detail)
//! - WHO Global Health Observatory (indicator values and catalogue)
//! - SNPedia (SNP page extracts)
//! - An OpenAI-compatible completion endpoint (AI analysis)
//!
//! Shared fetch plumbing lives in [`retry`]; the request-count limiter used
//! by the AI routes lives in [`rate_limit`].

pub mod rate_limit;
pub mod retry;

mod clinical_trials;
mod completions;
mod snpedia;
mod who_gho;

pub use clinical_trials::{ClinicalTrialsClient, ClinicalTrialsConfig, OVERALL_STATUSES};
pub use completions::{CompletionClient, CompletionConfig, CompletionError};
pub use rate_limit::{RateLimitConfig, RateLimiter};
pub use retry::{get_json, FetchError, RetryPolicy};
pub use snpedia::{SnpExtract, SnpediaClient, SnpediaConfig};
pub use who_gho::{GhoIndicator, WhoGhoClient, WhoGhoConfig};
