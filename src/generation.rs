//! Text generation port and the OpenAI chat-completion adapter.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::Config;
use crate::error::{HostSummaryError, Result};

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 500;

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Submit `prompt` and return the generated text. One attempt, no retry.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Fixed per-request completion parameters
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

// OpenAI chat-completions implementation
pub struct OpenAiChatClient {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    params: GenerationParams,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl OpenAiChatClient {
    pub fn new(
        api_key: Option<String>,
        base_url: impl Into<String>,
        params: GenerationParams,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HostSummaryError::Config {
                message: format!("Failed to build reqwest client with timeout: {}", e),
            })?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.into(),
            params,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        if config.runtime.openai_api_key.is_none() {
            tracing::warn!("OPENAI_API_KEY is not set; summary generation will fail");
        }
        Self::new(
            config.runtime.openai_api_key.clone(),
            config.generation.base_url.clone(),
            config.generation.params(),
            Duration::from_millis(config.generation.timeout_ms),
        )
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl TextGenerator for OpenAiChatClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| HostSummaryError::Generation {
                message: "No API key provided. Set OPENAI_API_KEY in the environment or .env file"
                    .to_string(),
            })?;

        debug!(
            "Requesting chat completion (model={}, chars={})",
            self.params.model,
            prompt.len()
        );

        let body = ChatRequest {
            model: &self.params.model,
            messages: vec![ChatMessage {
                role: "system",
                content: prompt,
            }],
            temperature: self.params.temperature,
            max_tokens: self.params.max_tokens,
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            // Prefer the API's own message so callers see e.g. quota errors verbatim
            let message = serde_json::from_str::<ApiErrorBody>(&error_text)
                .map(|b| b.error.message)
                .unwrap_or_else(|_| format!("OpenAI API error {}: {}", status, error_text));
            return Err(HostSummaryError::Generation { message });
        }

        let parsed: ChatResponse =
            response
                .json()
                .await
                .map_err(|e| HostSummaryError::Generation {
                    message: format!("Failed to parse OpenAI response: {}", e),
                })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| HostSummaryError::Generation {
                message: "No completion returned from OpenAI".to_string(),
            })
    }
}
