//! LLM client: the single point of entry for every model call in the service.
//!
//! Two vendors sit behind this module:
//! - `openai`: chat completions, drafts and refines hiring content (generation service)
//! - `anthropic`: messages API, grades the draft against the rubric (evaluator service)
//!
//! ARCHITECTURAL RULE: No other module may call either API directly.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

pub mod anthropic;
pub mod openai;
pub mod prompts;

/// Timeout applied to every upstream HTTP call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// Token counts reported by the upstream service. Either side may be absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
}

impl TokenUsage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens: Some(prompt_tokens),
            completion_tokens: Some(completion_tokens),
        }
    }

    pub fn total(&self) -> Option<u32> {
        match (self.prompt_tokens, self.completion_tokens) {
            (None, None) => None,
            (p, c) => Some(p.unwrap_or(0) + c.unwrap_or(0)),
        }
    }

    /// Sums two usage reports; a side stays `None` only if both inputs lack it.
    pub fn combine(self, other: TokenUsage) -> TokenUsage {
        fn add(a: Option<u32>, b: Option<u32>) -> Option<u32> {
            match (a, b) {
                (None, None) => None,
                (a, b) => Some(a.unwrap_or(0) + b.unwrap_or(0)),
            }
        }
        TokenUsage {
            prompt_tokens: add(self.prompt_tokens, other.prompt_tokens),
            completion_tokens: add(self.completion_tokens, other.completion_tokens),
        }
    }
}

/// Raw output of one model call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationResult {
    pub raw_text: String,
    pub usage: TokenUsage,
}

/// A text-generation backend: system instructions plus one user turn in, text out.
///
/// Both vendor clients implement this, so the pipeline never knows which vendor
/// sits behind a given stage.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, system: &str, user_content: &str)
        -> Result<GenerationResult, LlmError>;
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Both vendors wrap failures as `{"error": {"message": ...}}`; fall back to the raw body.
fn vendor_error_message(body: String) -> String {
    serde_json::from_str::<ApiErrorEnvelope>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body)
}

pub(crate) fn build_http_client() -> Result<reqwest::Client, LlmError> {
    Ok(reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?)
}

/// Sends a request built by `build`, retrying transport errors, 429 and 5xx
/// with exponential backoff (1s, 2s, 4s, ...) up to `max_retries` times.
/// Any other non-success status fails immediately. Once retries run out the
/// last attempt's error is returned.
pub(crate) async fn send_with_retry<F>(max_retries: u32, build: F) -> Result<Response, LlmError>
where
    F: Fn() -> RequestBuilder,
{
    let mut attempt: u32 = 0;

    loop {
        let error = match build().send().await {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    return Ok(response);
                }

                let body = response.text().await.unwrap_or_default();
                let error = LlmError::Api {
                    status: status.as_u16(),
                    message: vendor_error_message(body),
                };
                if status.as_u16() != 429 && !status.is_server_error() {
                    return Err(error);
                }
                warn!("LLM API returned {status}: {error}");
                error
            }
            Err(e) => LlmError::Http(e),
        };

        if attempt >= max_retries {
            return Err(error);
        }
        attempt += 1;

        let delay = Duration::from_millis(1000 * (1 << (attempt - 1).min(6)));
        warn!(
            "LLM call attempt {} failed ({}), retrying after {}ms...",
            attempt,
            error,
            delay.as_millis()
        );
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_usage_total_sums_both_sides() {
        assert_eq!(TokenUsage::new(120, 30).total(), Some(150));
        assert_eq!(TokenUsage::default().total(), None);
    }

    #[test]
    fn test_usage_combine_keeps_none_when_both_missing() {
        let combined = TokenUsage::default().combine(TokenUsage::default());
        assert_eq!(combined, TokenUsage::default());

        let combined = TokenUsage::new(10, 5).combine(TokenUsage {
            prompt_tokens: Some(7),
            completion_tokens: None,
        });
        assert_eq!(combined, TokenUsage::new(17, 5));
    }

    #[test]
    fn test_vendor_error_message_prefers_envelope() {
        let body = r#"{"error": {"message": "invalid x-api-key", "type": "auth"}}"#;
        assert_eq!(vendor_error_message(body.to_string()), "invalid x-api-key");
        assert_eq!(vendor_error_message("gateway down".to_string()), "gateway down");
    }

    #[tokio::test]
    async fn test_send_with_retry_fails_fast_on_client_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_string(r#"{"error": {"message": "bad request body"}}"#),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = build_http_client().unwrap();
        let url = server.uri();
        let result = send_with_retry(3, || client.post(&url)).await;

        match result {
            Err(LlmError::Api { status, message }) => {
                assert_eq!(status, 400);
                assert_eq!(message, "bad request body");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_send_with_retry_without_retries_surfaces_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .expect(1)
            .mount(&server)
            .await;

        let client = build_http_client().unwrap();
        let url = server.uri();
        let result = send_with_retry(0, || client.post(&url)).await;

        assert!(matches!(result, Err(LlmError::Api { status: 503, .. })));
    }

    #[tokio::test]
    async fn test_send_with_retry_exhausted_returns_last_vendor_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(429)
                    .set_body_string(r#"{"error": {"message": "slow down"}}"#),
            )
            .expect(2)
            .mount(&server)
            .await;

        let client = build_http_client().unwrap();
        let url = server.uri();
        let result = send_with_retry(1, || client.post(&url)).await;

        match result {
            Err(LlmError::Api { status, message }) => {
                assert_eq!(status, 429);
                assert_eq!(message, "slow down");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_send_with_retry_recovers_after_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;

        let client = build_http_client().unwrap();
        let url = server.uri();
        let response = send_with_retry(1, || client.post(&url)).await.unwrap();

        assert_eq!(response.text().await.unwrap(), "ok");
    }
}
