// file: src/llm/chat.rs
// description: OpenAI-compatible chat completion client
// reference: https://platform.openai.com/docs/api-reference/chat

use crate::config::OpenAiConfig;
use crate::error::{AskemError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const SERVICE: &str = "chat completion API";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Clone)]
pub struct ChatClient {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
    max_concurrency: usize,
}

impl ChatClient {
    pub fn new(config: &OpenAiConfig) -> Result<Self> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            AskemError::Config("chat completion API key is not set (OPENAI_API_KEY)".to_string())
        })?;

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
            max_concurrency: config.max_concurrency.max(1),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Send a conversation and return the content of the first choice.
    pub async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);

        debug!(
            "Requesting chat completion from {} with {} messages",
            self.model,
            messages.len()
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&ChatRequest {
                model: &self.model,
                messages,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AskemError::Upstream {
                service: SERVICE,
                status: status.as_u16(),
                message: error_text,
            });
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| AskemError::invalid_response(SERVICE, e.to_string()))?;

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AskemError::invalid_response(SERVICE, "no choices returned"))
    }
}
