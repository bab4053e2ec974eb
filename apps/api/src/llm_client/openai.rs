//! Generation service client (OpenAI chat completions).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{build_http_client, send_with_retry, GenerationResult, LlmError, TextGenerator, TokenUsage};

const OPENAI_API_URL: &str = "https://api.openai.com/v1";
/// The model that drafts and refines all hiring content.
pub const MODEL: &str = "gpt-4o-mini";
/// Sampling temperature for drafting and refinement.
pub const TEMPERATURE: f32 = 0.7;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

/// Client for the generation model.
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
    max_retries: u32,
}

impl OpenAiClient {
    pub fn new(api_key: String, max_retries: u32) -> Result<Self, LlmError> {
        Ok(Self {
            client: build_http_client()?,
            api_key,
            base_url: OPENAI_API_URL.to_string(),
            max_retries,
        })
    }

    /// Points the client at a different API root (proxies, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    async fn generate(
        &self,
        system: &str,
        user_content: &str,
    ) -> Result<GenerationResult, LlmError> {
        let request_body = ChatRequest {
            model: MODEL,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user_content,
                },
            ],
            temperature: TEMPERATURE,
        };

        let url = format!("{}/chat/completions", self.base_url);
        let response = send_with_retry(self.max_retries, || {
            self.client
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(&request_body)
        })
        .await?;

        let chat: ChatResponse = response.json().await?;

        let text = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(LlmError::EmptyContent)?;

        // The model sometimes wraps its whole answer in quotes.
        let text = text.trim().trim_matches('"').trim();
        if text.is_empty() {
            return Err(LlmError::EmptyContent);
        }

        let usage = chat
            .usage
            .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        debug!(
            "Generation call succeeded: prompt_tokens={:?}, completion_tokens={:?}",
            usage.prompt_tokens, usage.completion_tokens
        );

        Ok(GenerationResult {
            raw_text: text.to_string(),
            usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> OpenAiClient {
        OpenAiClient::new("sk-test".to_string(), 0)
            .unwrap()
            .with_base_url(server.uri())
    }

    #[tokio::test]
    async fn test_generate_sends_system_and_user_turns() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": MODEL,
                "messages": [
                    {"role": "system", "content": "be helpful"},
                    {"role": "user", "content": "USER NOTES:\nhello"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "  \"Draft text\"  "}}],
                "usage": {"prompt_tokens": 42, "completion_tokens": 7, "total_tokens": 49}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let result = client.generate("be helpful", "USER NOTES:\nhello").await.unwrap();

        assert_eq!(result.raw_text, "Draft text");
        assert_eq!(result.usage, TokenUsage::new(42, 7));
    }

    #[tokio::test]
    async fn test_generate_tolerates_missing_usage() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content": "Draft"}}]
            })))
            .mount(&server)
            .await;

        let result = client_for(&server).await.generate("s", "u").await.unwrap();
        assert_eq!(result.usage, TokenUsage::default());
    }

    #[tokio::test]
    async fn test_generate_empty_choices_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let result = client_for(&server).await.generate("s", "u").await;
        assert!(matches!(result, Err(LlmError::EmptyContent)));
    }

    #[tokio::test]
    async fn test_generate_surfaces_auth_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}
            })))
            .mount(&server)
            .await;

        let result = client_for(&server).await.generate("s", "u").await;
        match result {
            Err(LlmError::Api { status, message }) => {
                assert_eq!(status, 401);
                assert_eq!(message, "Incorrect API key provided");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }
}
