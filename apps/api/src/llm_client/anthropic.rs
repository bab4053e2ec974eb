//! Evaluator service client (Anthropic Messages API).
//!
//! Grades drafts produced by the generation model.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{build_http_client, send_with_retry, GenerationResult, LlmError, TextGenerator, TokenUsage};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The model used for every evaluator call.
pub const MODEL: &str = "claude-sonnet-4-5";
const MAX_TOKENS: u32 = 1024;

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmResponse {
    /// Extracts the text content from the first text block.
    pub fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

#[derive(Clone)]
pub struct AnthropicClient {
    client: Client,
    api_key: String,
    base_url: String,
    max_retries: u32,
}

impl AnthropicClient {
    pub fn new(api_key: String, max_retries: u32) -> Result<Self, LlmError> {
        Ok(Self {
            client: build_http_client()?,
            api_key,
            base_url: ANTHROPIC_API_URL.to_string(),
            max_retries,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl TextGenerator for AnthropicClient {
    async fn generate(
        &self,
        system: &str,
        user_content: &str,
    ) -> Result<GenerationResult, LlmError> {
        let request_body = AnthropicRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            system,
            messages: vec![AnthropicMessage {
                role: "user",
                content: user_content,
            }],
        };

        let url = format!("{}/messages", self.base_url);
        let response = send_with_retry(self.max_retries, || {
            self.client
                .post(&url)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .header("content-type", "application/json")
                .json(&request_body)
        })
        .await?;

        let llm_response: LlmResponse = response.json().await?;

        debug!(
            "Evaluator call succeeded: input_tokens={}, output_tokens={}",
            llm_response.usage.input_tokens, llm_response.usage.output_tokens
        );

        let text = llm_response.text().ok_or(LlmError::EmptyContent)?;

        Ok(GenerationResult {
            raw_text: text.trim().to_string(),
            usage: TokenUsage::new(
                llm_response.usage.input_tokens,
                llm_response.usage.output_tokens,
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_text_picks_first_text_block() {
        let response: LlmResponse = serde_json::from_value(json!({
            "content": [
                {"type": "thinking"},
                {"type": "text", "text": "Score: 4"}
            ],
            "usage": {"input_tokens": 1, "output_tokens": 1}
        }))
        .unwrap();
        assert_eq!(response.text(), Some("Score: 4"));
    }

    #[tokio::test]
    async fn test_generate_sends_vendor_headers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/messages"))
            .and(header("x-api-key", "ak-test"))
            .and(header("anthropic-version", ANTHROPIC_VERSION))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [{"type": "text", "text": "Score: 3\nFeedback: tighten the summary\n"}],
                "usage": {"input_tokens": 300, "output_tokens": 20}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = AnthropicClient::new("ak-test".to_string(), 0)
            .unwrap()
            .with_base_url(server.uri());
        let result = client.generate("grade this", "draft").await.unwrap();

        assert_eq!(result.raw_text, "Score: 3\nFeedback: tighten the summary");
        assert_eq!(result.usage, TokenUsage::new(300, 20));
    }

    #[tokio::test]
    async fn test_generate_without_text_block_is_empty_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [],
                "usage": {"input_tokens": 3, "output_tokens": 0}
            })))
            .mount(&server)
            .await;

        let client = AnthropicClient::new("ak-test".to_string(), 0)
            .unwrap()
            .with_base_url(server.uri());
        let result = client.generate("grade this", "draft").await;

        assert!(matches!(result, Err(LlmError::EmptyContent)));
    }
}
