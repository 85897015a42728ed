//! Retry-with-Backoff Fetch Helpers
//!
//! Shared fetch logic for the upstream clients. A request is retried on
//! transport failures and retryable statuses with capped exponential
//! backoff; an upstream 404 is terminal and never retried.

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Backoff schedule for retried fetches
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts before giving up
    pub max_retries: u32,
    /// Delay before the first retry
    pub base_delay: Duration,
    /// Cap on the backoff delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(3),
        }
    }
}

impl RetryPolicy {
    /// Policy with a custom attempt count and the default delays
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Default::default()
        }
    }

    /// Delay before the retry that follows failed attempt `attempt` (0-based).
    /// Doubles each attempt, capped at `max_delay`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exp = self
            .base_delay
            .saturating_mul(2u32.saturating_pow(attempt));
        exp.min(self.max_delay)
    }
}

/// Errors from an upstream fetch
#[derive(Error, Debug)]
pub enum FetchError {
    /// Upstream returned 404; never retried
    #[error("upstream resource not found")]
    NotFound,

    #[error("upstream error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("request timeout")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("decode error: {0}")]
    Decode(String),
}

impl FetchError {
    fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}

/// GET a JSON document, retrying per `policy`
pub async fn get_json(client: &Client, url: &str, policy: &RetryPolicy) -> Result<Value, FetchError> {
    get(client, url, policy).await
}

/// GET and deserialize a JSON response, retrying per `policy`
///
/// Issues up to `policy.max_retries` attempts. Non-2xx statuses and
/// transport errors are retried after a backoff delay; a 404 short-circuits
/// immediately. The last error is returned once attempts are exhausted.
pub async fn get<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    policy: &RetryPolicy,
) -> Result<T, FetchError> {
    let mut last_error = FetchError::Transport("no attempts made".to_string());

    for attempt in 0..policy.max_retries {
        if attempt > 0 {
            tokio::time::sleep(policy.delay_for(attempt - 1)).await;
        }

        let result = client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await;

        match result {
            Ok(response) => {
                let status = response.status();

                if status == reqwest::StatusCode::NOT_FOUND {
                    return Err(FetchError::NotFound);
                }

                if status.is_success() {
                    return response
                        .json()
                        .await
                        .map_err(|e| FetchError::Decode(e.to_string()));
                }

                let body = response.text().await.unwrap_or_default();
                tracing::warn!(
                    url,
                    status = status.as_u16(),
                    attempt = attempt + 1,
                    "upstream request failed"
                );
                last_error = FetchError::Status {
                    status: status.as_u16(),
                    body,
                };
            }
            Err(e) => {
                tracing::warn!(url, attempt = attempt + 1, error = %e, "upstream request error");
                last_error = FetchError::from_reqwest(e);
            }
        }
    }

    Err(last_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::State, http::StatusCode, routing::get as axum_get, Router};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Clone)]
    struct Hits(Arc<AtomicUsize>);

    async fn spawn_server(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn fast_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(4),
        }
    }

    #[test]
    fn test_delay_doubles_and_caps() {
        let policy = RetryPolicy {
            max_retries: 5,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(3),
        };
        assert_eq!(policy.delay_for(0), Duration::from_secs(1));
        assert_eq!(policy.delay_for(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for(2), Duration::from_secs(3));
        assert_eq!(policy.delay_for(3), Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_succeeds_after_failures() {
        let hits = Hits(Arc::new(AtomicUsize::new(0)));
        let router = Router::new()
            .route(
                "/",
                axum_get(|State(hits): State<Hits>| async move {
                    let n = hits.0.fetch_add(1, Ordering::SeqCst);
                    if n < 2 {
                        (StatusCode::INTERNAL_SERVER_ERROR, "boom".to_string())
                    } else {
                        (StatusCode::OK, r#"{"ok":true}"#.to_string())
                    }
                }),
            )
            .with_state(hits.clone());

        let base = spawn_server(router).await;
        let client = Client::new();

        let body = get_json(&client, &base, &fast_policy(3)).await.unwrap();
        assert_eq!(body["ok"], true);
        assert_eq!(hits.0.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhausts_configured_attempts() {
        let hits = Hits(Arc::new(AtomicUsize::new(0)));
        let router = Router::new()
            .route(
                "/",
                axum_get(|State(hits): State<Hits>| async move {
                    hits.0.fetch_add(1, Ordering::SeqCst);
                    (StatusCode::INTERNAL_SERVER_ERROR, "boom")
                }),
            )
            .with_state(hits.clone());

        let base = spawn_server(router).await;
        let client = Client::new();

        let err = get_json(&client, &base, &fast_policy(3)).await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 500, .. }));
        assert_eq!(hits.0.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_not_found_is_terminal() {
        let hits = Hits(Arc::new(AtomicUsize::new(0)));
        let router = Router::new()
            .route(
                "/",
                axum_get(|State(hits): State<Hits>| async move {
                    hits.0.fetch_add(1, Ordering::SeqCst);
                    StatusCode::NOT_FOUND
                }),
            )
            .with_state(hits.clone());

        let base = spawn_server(router).await;
        let client = Client::new();

        let err = get_json(&client, &base, &fast_policy(3)).await.unwrap_err();
        assert!(matches!(err, FetchError::NotFound));
        assert_eq!(hits.0.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_typed_deserialization() {
        #[derive(serde::Deserialize)]
        struct Payload {
            count: u32,
        }

        let router = Router::new().route("/", axum_get(|| async { r#"{"count":7}"# }));
        let base = spawn_server(router).await;
        let client = Client::new();

        let payload: Payload = get(&client, &base, &fast_policy(1)).await.unwrap();
        assert_eq!(payload.count, 7);
    }
}
