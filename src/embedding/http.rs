// file: src/embedding/http.rs
// description: sentence embeddings from an OpenAI-compatible embeddings endpoint
// reference: https://platform.openai.com/docs/api-reference/embeddings

use crate::config::EmbeddingConfig;
use crate::embedding::Embedder;
use crate::embedding::pooling::normalize;
use crate::error::{AskemError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const SERVICE: &str = "embedding API";

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    input: &'a [String],
    model: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

pub struct HttpEmbeddingClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl HttpEmbeddingClient {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model_id().to_string(),
        })
    }
}

#[async_trait]
impl Embedder for HttpEmbeddingClient {
    async fn embed(&self, sentences: &[String]) -> Result<Vec<Vec<f32>>> {
        if sentences.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/embeddings", self.base_url);

        debug!(
            "Requesting {} embeddings from {} ({})",
            sentences.len(),
            url,
            self.model
        );

        let mut request = self.client.post(&url).json(&EmbeddingRequest {
            input: sentences,
            model: &self.model,
        });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;

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

        let mut body: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| AskemError::invalid_response(SERVICE, e.to_string()))?;

        if body.data.len() != sentences.len() {
            return Err(AskemError::invalid_response(
                SERVICE,
                format!(
                    "expected {} embeddings, got {}",
                    sentences.len(),
                    body.data.len()
                ),
            ));
        }

        body.data.sort_by_key(|d| d.index);

        Ok(body
            .data
            .into_iter()
            .map(|d| normalize(&d.embedding))
            .collect())
    }
}
