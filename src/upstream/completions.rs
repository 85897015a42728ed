//! Chat Completion Client
//!
//! Client for an OpenAI-compatible chat-completions endpoint, used by the
//! genetic-analysis and trial-ranking routes.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use super::retry::RetryPolicy;

/// Chat-completion API client
pub struct CompletionClient {
    client: Client,
    config: CompletionConfig,
}

/// Configuration for the completion client
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    /// Base URL (e.g., "https://api.openai.com")
    pub base_url: String,
    /// Bearer token for the API
    pub api_key: String,
    /// Model name sent with every request
    pub model: String,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Retry schedule
    pub retry: RetryPolicy,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".to_string(),
            api_key: String::new(),
            model: "gpt-4".to_string(),
            request_timeout_ms: 30_000,
            retry: RetryPolicy::default(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

impl CompletionClient {
    pub fn new(config: CompletionConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, config }
    }

    /// Get the current configuration
    pub fn config(&self) -> &CompletionConfig {
        &self.config
    }

    /// Run one completion and return the first choice's content
    ///
    /// Retries with backoff on transport failures; on HTTP 429 the
    /// `Retry-After` header is honored before the next attempt. Other API
    /// errors are terminal.
    pub async fn complete(
        &self,
        system: &str,
        user: &str,
        temperature: f64,
        max_tokens: u32,
    ) -> Result<String, CompletionError> {
        let url = format!("{}/v1/chat/completions", self.config.base_url);
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature,
            max_tokens,
        };

        let mut last_error = CompletionError::Unavailable;

        for attempt in 0..self.config.retry.max_retries {
            if attempt > 0 {
                tokio::time::sleep(self.config.retry.delay_for(attempt - 1)).await;
            }

            match self
                .client
                .post(&url)
                .bearer_auth(&self.config.api_key)
                .json(&body)
                .send()
                .await
            {
                Ok(response) => {
                    if response.status().is_success() {
                        let parsed: ChatResponse =
                            response.json().await.map_err(CompletionError::Request)?;
                        return parsed
                            .choices
                            .into_iter()
                            .next()
                            .map(|choice| choice.message.content)
                            .ok_or(CompletionError::Empty);
                    } else if response.status().as_u16() == 429 {
                        if let Some(retry_after) = response.headers().get("Retry-After") {
                            if let Ok(secs) = retry_after.to_str().unwrap_or("5").parse::<u64>() {
                                tokio::time::sleep(Duration::from_secs(secs)).await;
                            }
                        }
                        last_error = CompletionError::RateLimited;
                        continue;
                    } else {
                        let status = response.status();
                        let text = response.text().await.unwrap_or_default();
                        return Err(CompletionError::Api {
                            status: status.as_u16(),
                            message: text,
                        });
                    }
                }
                Err(e) => {
                    last_error = if e.is_timeout() {
                        CompletionError::Timeout
                    } else if e.is_connect() {
                        CompletionError::Unavailable
                    } else {
                        CompletionError::Request(e)
                    };
                    continue;
                }
            }
        }

        Err(last_error)
    }
}

/// Errors from the completion endpoint
#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("completion service unavailable")]
    Unavailable,

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("completion API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("request timeout")]
    Timeout,

    #[error("completion service rate limited")]
    RateLimited,

    #[error("completion returned no choices")]
    Empty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CompletionConfig::default();
        assert_eq!(config.base_url, "https://api.openai.com");
        assert_eq!(config.model, "gpt-4");
        assert!(config.api_key.is_empty());
    }

    #[test]
    fn test_chat_request_shape() {
        let request = ChatRequest {
            model: "gpt-4",
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: "be brief",
                },
                ChatMessage {
                    role: "user",
                    content: "hello",
                },
            ],
            temperature: 0.7,
            max_tokens: 100,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], "gpt-4");
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "hello");
        assert_eq!(value["max_tokens"], 100);
    }
}
