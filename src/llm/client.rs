//! OpenAI-compatible chat completion client

use crate::config::LlmConfig;
use crate::error::{QuickApplyError, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A single-prompt completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub prompt: String,
    pub max_tokens: Option<u32>,
    pub temperature: f32,
}

impl ChatRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            max_tokens: None,
            temperature: 0.7,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Anything that can turn a prompt into text.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn complete(&self, request: &ChatRequest) -> Result<String>;

    fn model(&self) -> &str;
}

#[derive(Debug, Serialize, Deserialize, Clone)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatCompletionChoice>,
}

/// Client for any server speaking the `/chat/completions` protocol (OpenAI, Groq, Ollama).
#[derive(Clone)]
pub struct OpenAiCompatClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiCompatClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| QuickApplyError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl ChatBackend for OpenAiCompatClient {
    async fn complete(&self, request: &ChatRequest) -> Result<String> {
        let body = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: request.prompt.clone(),
            }],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        debug!("Sending {} prompt characters to {}", request.prompt.len(), self.endpoint());

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(QuickApplyError::Llm(format!("HTTP {}: {}", status.as_u16(), error_text)));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| QuickApplyError::Llm(format!("Failed to parse response: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| QuickApplyError::Llm("No choices in response".to_string()))
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let mut config = Config::default().llm;
        config.base_url = "http://localhost:11434/v1/".to_string();
        let client = OpenAiCompatClient::new(&config).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:11434/v1/chat/completions");
        assert_eq!(client.model(), "llama3");
    }

    #[test]
    fn test_request_serialization_omits_unset_limit() {
        let body = ChatCompletionRequest {
            model: "llama3".to_string(),
            messages: vec![],
            temperature: 0.2,
            max_tokens: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("max_tokens").is_none());
        assert_eq!(json["model"], "llama3");
    }
}
