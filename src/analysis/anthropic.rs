//! Anthropic Messages API client.

use super::{CompletionClient, CompletionRequest};
use crate::config::AiConfig;
use crate::error::ResearchError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: Option<String>,
}

/// Completion client for Claude models.
pub struct AnthropicClient {
    api_key: String,
    api_url: String,
    timeout_seconds: u64,
    http_client: reqwest::Client,
}

impl AnthropicClient {
    pub fn new(api_key: &str, config: &AiConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to create AI HTTP client")?;

        Ok(Self {
            api_key: api_key.trim().to_string(),
            api_url: config.api_url.clone(),
            timeout_seconds: config.timeout_seconds,
            http_client,
        })
    }
}

#[async_trait]
impl CompletionClient for AnthropicClient {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, ResearchError> {
        let body = MessagesRequest {
            model: request.model,
            max_tokens: request.max_tokens,
            messages: vec![Message {
                role: "user",
                content: request.prompt,
            }],
        };

        debug!("Calling {} with model {}", self.api_url, request.model);

        let response = self
            .http_client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ResearchError::ai(format!("request timed out after {}s", self.timeout_seconds))
                } else if e.is_connect() {
                    ResearchError::ai(format!("cannot connect to {}", self.api_url))
                } else {
                    ResearchError::ai(format!("failed to send request: {}", e))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(ResearchError::ai(format!("API error {}: {}", status, text)));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| ResearchError::ai(format!("malformed response: {}", e)))?;

        first_text(parsed)
    }
}

/// Text of the first `text` block.
fn first_text(response: MessagesResponse) -> Result<String, ResearchError> {
    response
        .content
        .into_iter()
        .filter(|block| block.content_type == "text")
        .find_map(|block| block.text)
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| ResearchError::ai("response contained no text"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let body = MessagesRequest {
            model: "claude-3-5-sonnet-20241022",
            max_tokens: 1000,
            messages: vec![Message {
                role: "user",
                content: "hello",
            }],
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "claude-3-5-sonnet-20241022");
        assert_eq!(json["max_tokens"], 1000);
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hello");
    }

    #[test]
    fn test_first_text_block() {
        let response: MessagesResponse = serde_json::from_str(
            r###"{"content":[{"type":"tool_use","id":"x"},{"type":"text","text":"## Insights"}]}"###,
        )
        .unwrap();
        assert_eq!(first_text(response).unwrap(), "## Insights");
    }

    #[test]
    fn test_empty_content_is_error() {
        let response: MessagesResponse = serde_json::from_str(r#"{"content":[]}"#).unwrap();
        assert!(first_text(response).is_err());

        let blank: MessagesResponse =
            serde_json::from_str(r#"{"content":[{"type":"text","text":"  "}]}"#).unwrap();
        assert!(first_text(blank).is_err());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_ai_error() {
        let config = AiConfig {
            api_url: "http://127.0.0.1:9/v1/messages".to_string(),
            timeout_seconds: 2,
            ..AiConfig::default()
        };
        let client = AnthropicClient::new("sk-ant-test", &config).unwrap();

        let result = client
            .complete(CompletionRequest {
                model: "claude-3-5-sonnet-20241022",
                max_tokens: 10,
                prompt: "hi",
            })
            .await;

        assert!(matches!(result, Err(ResearchError::AiUnavailable(_))));
    }
}
