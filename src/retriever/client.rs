// file: src/retriever/client.rs
// description: Weaviate REST and GraphQL client wrapper with api key auth
// reference: https://weaviate.io/developers/weaviate/api/rest

use crate::config::WeaviateConfig;
use crate::error::{AskemError, Result};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, info};

const SERVICE: &str = "weaviate";

#[derive(Clone)]
pub struct WeaviateClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

/// Outcome of a `/v1/batch/objects` call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutcome {
    pub inserted: usize,
    pub failed: Vec<(String, String)>,
}

#[derive(Debug, Deserialize)]
struct BatchItem {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    result: Option<BatchItemResult>,
}

#[derive(Debug, Deserialize)]
struct BatchItemResult {
    #[serde(default)]
    errors: Option<BatchErrors>,
}

#[derive(Debug, Deserialize)]
struct BatchErrors {
    #[serde(default)]
    error: Vec<BatchErrorMessage>,
}

#[derive(Debug, Deserialize)]
struct BatchErrorMessage {
    message: String,
}

impl WeaviateClient {
    /// Connect using explicit values, falling back to `WEAVIATE_URL` and
    /// `WEAVIATE_APIKEY` for whichever is missing.
    pub fn get_client(url: Option<String>, api_key: Option<String>) -> Result<Self> {
        let config = WeaviateConfig {
            url: url.or_else(|| std::env::var("WEAVIATE_URL").ok()),
            api_key: api_key.or_else(|| std::env::var("WEAVIATE_APIKEY").ok()),
            ..WeaviateConfig::default()
        };
        Self::new(&config)
    }

    pub fn new(config: &WeaviateConfig) -> Result<Self> {
        let url = config.url.as_deref().ok_or_else(|| {
            AskemError::Config("Weaviate URL is not set (WEAVIATE_URL)".to_string())
        })?;
        crate::utils::Validator::validate_url(url)?;

        info!("Connecting to Weaviate at {}", url);

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        let builder = self
            .http
            .request(method, format!("{}{}", self.base_url, path));

        match &self.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    async fn check(response: Response) -> Result<Response> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        Err(AskemError::Upstream {
            service: SERVICE,
            status: status.as_u16(),
            message,
        })
    }

    pub async fn is_ready(&self) -> Result<bool> {
        debug!("Checking Weaviate readiness");

        let response = self
            .request(reqwest::Method::GET, "/v1/.well-known/ready")
            .send()
            .await?;

        Ok(response.status().is_success())
    }

    /// Run a GraphQL query and return the raw body, `errors` included.
    pub async fn graphql(&self, query: &str) -> Result<Value> {
        debug!("GraphQL query: {}", query);

        let response = self
            .request(reqwest::Method::POST, "/v1/graphql")
            .json(&json!({ "query": query }))
            .send()
            .await?;

        let body = Self::check(response).await?.json::<Value>().await?;
        Ok(body)
    }

    pub async fn class_exists(&self, class_name: &str) -> Result<bool> {
        let response = self
            .request(reqwest::Method::GET, &format!("/v1/schema/{}", class_name))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }

        Self::check(response).await?;
        Ok(true)
    }

    pub async fn create_class(&self, schema: &Value) -> Result<()> {
        let response = self
            .request(reqwest::Method::POST, "/v1/schema")
            .json(schema)
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    pub async fn delete_class(&self, class_name: &str) -> Result<()> {
        let response = self
            .request(reqwest::Method::DELETE, &format!("/v1/schema/{}", class_name))
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    pub async fn batch_objects(&self, objects: &[Value]) -> Result<BatchOutcome> {
        if objects.is_empty() {
            return Ok(BatchOutcome::default());
        }

        let response = self
            .request(reqwest::Method::POST, "/v1/batch/objects")
            .json(&json!({ "objects": objects }))
            .send()
            .await?;

        let items: Vec<BatchItem> = Self::check(response).await?.json().await?;

        let mut outcome = BatchOutcome::default();
        for item in items {
            let errors: Vec<String> = item
                .result
                .and_then(|r| r.errors)
                .map(|e| e.error.into_iter().map(|m| m.message).collect())
                .unwrap_or_default();

            if errors.is_empty() {
                outcome.inserted += 1;
            } else {
                outcome
                    .failed
                    .push((item.id.unwrap_or_default(), errors.join("; ")));
            }
        }

        Ok(outcome)
    }

    pub async fn count_objects(&self, class_name: &str) -> Result<u64> {
        let query = format!("{{ Aggregate {{ {} {{ meta {{ count }} }} }} }}", class_name);
        let body = self.graphql(&query).await?;

        if let Some(errors) = body.get("errors") {
            return Err(AskemError::Query(errors.clone()));
        }

        body.pointer(&format!("/data/Aggregate/{}/0/meta/count", class_name))
            .and_then(Value::as_u64)
            .ok_or_else(|| AskemError::invalid_response(SERVICE, "missing aggregate count"))
    }
}
