// file: src/config.rs
// description: application configuration management with toml and environment support
// reference: https://docs.rs/config

use crate::error::{AskemError, Result};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Embedding model requested from the HTTP backend when none is configured.
pub const HTTP_EMBEDDING_MODEL: &str = "sentence-transformers/all-mpnet-base-v2";

/// BERT checkpoint loaded by the local backend when none is configured.
pub const LOCAL_EMBEDDING_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub weaviate: WeaviateConfig,
    pub openai: OpenAiConfig,
    pub embedding: EmbeddingConfig,
    pub summarizer: SummarizerConfig,
    pub retriever: RetrieverConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WeaviateConfig {
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub class_name: String,
    pub timeout_secs: u64,
    pub batch_size: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    /// Upper bound on concurrent chat requests when compressing many chunks.
    pub max_concurrency: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelBackend {
    /// Hosted endpoint reached over HTTP
    Http,
    /// Checkpoint loaded in-process (requires the `local-models` feature)
    Local,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub backend: ModelBackend,
    /// Unset picks the backend's default model.
    pub model: Option<String>,
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SummarizerConfig {
    pub backend: ModelBackend,
    pub model: String,
    pub max_input_tokens: usize,
    pub max_new_tokens: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetrieverConfig {
    pub top_k: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for WeaviateConfig {
    fn default() -> Self {
        Self {
            url: None,
            api_key: None,
            class_name: "Passage".to_string(),
            timeout_secs: 30,
            batch_size: 100,
        }
    }
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            timeout_secs: 120,
            max_concurrency: 8,
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            backend: ModelBackend::Http,
            model: None,
            base_url: "http://localhost:8001/v1".to_string(),
            api_key: None,
            timeout_secs: 60,
        }
    }
}

impl EmbeddingConfig {
    pub fn model_id(&self) -> &str {
        match (&self.model, self.backend) {
            (Some(model), _) => model,
            (None, ModelBackend::Http) => HTTP_EMBEDDING_MODEL,
            (None, ModelBackend::Local) => LOCAL_EMBEDDING_MODEL,
        }
    }
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            backend: ModelBackend::Http,
            model: "google/flan-t5-base".to_string(),
            max_input_tokens: 16384,
            max_new_tokens: 512,
        }
    }
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            top_k: crate::models::DEFAULT_TOP_K,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv().ok();

        let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_PATH));

        let settings = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(
                config::Environment::with_prefix("ASKEM")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AskemError::Config(e.to_string()))?;

        let mut config: Config = settings
            .try_deserialize()
            .map_err(|e| AskemError::Config(e.to_string()))?;

        config.apply_env_fallbacks(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self::default()
    }

    /// Fill unset credentials from the conventional variables.
    pub fn apply_env_fallbacks<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.weaviate.url.is_none() {
            self.weaviate.url = lookup("WEAVIATE_URL");
        }
        if self.weaviate.api_key.is_none() {
            self.weaviate.api_key = lookup("WEAVIATE_APIKEY");
        }
        if self.openai.api_key.is_none() {
            self.openai.api_key = lookup("OPENAI_API_KEY");
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.weaviate.class_name.trim().is_empty() {
            return Err(AskemError::Config(
                "weaviate.class_name must not be empty".to_string(),
            ));
        }

        if self.weaviate.batch_size == 0 {
            return Err(AskemError::Config(
                "weaviate.batch_size must be greater than 0".to_string(),
            ));
        }

        if self.openai.max_concurrency == 0 {
            return Err(AskemError::Config(
                "openai.max_concurrency must be greater than 0".to_string(),
            ));
        }

        if self.retriever.top_k == 0 {
            return Err(AskemError::Config(
                "retriever.top_k must be greater than 0".to_string(),
            ));
        }

        if self.embedding.backend == ModelBackend::Local
            && self.embedding.model_id() == HTTP_EMBEDDING_MODEL
        {
            return Err(AskemError::Config(format!(
                "{} is an MPNet checkpoint; the local embedding backend needs a BERT model such as {}",
                HTTP_EMBEDDING_MODEL, LOCAL_EMBEDDING_MODEL
            )));
        }

        if self.summarizer.max_new_tokens == 0 {
            return Err(AskemError::Config(
                "summarizer.max_new_tokens must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default_config();
        assert_eq!(config.weaviate.class_name, "Passage");
        assert_eq!(config.openai.model, "gpt-3.5-turbo");
        assert_eq!(config.embedding.model_id(), HTTP_EMBEDDING_MODEL);
        assert_ne!(
            config.embedding.base_url,
            "http://localhost:8080/v1",
            "embedding endpoint must not share the Weaviate port"
        );
        assert_eq!(config.retriever.top_k, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_fallbacks_fill_missing_only() {
        let vars: HashMap<&str, &str> = [
            ("WEAVIATE_URL", "http://weaviate:8080"),
            ("WEAVIATE_APIKEY", "env-key"),
            ("OPENAI_API_KEY", "sk-env"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default_config();
        config.weaviate.api_key = Some("file-key".to_string());
        config.apply_env_fallbacks(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.weaviate.url.as_deref(), Some("http://weaviate:8080"));
        assert_eq!(config.weaviate.api_key.as_deref(), Some("file-key"));
        assert_eq!(config.openai.api_key.as_deref(), Some("sk-env"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("askem.toml");
        fs::write(
            &path,
            "[weaviate]\nurl = \"http://localhost:8080\"\nclass_name = \"Chunk\"\n\n[openai]\nmax_concurrency = 2\n\n[summarizer]\nbackend = \"local\"\n",
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.weaviate.class_name, "Chunk");
        assert_eq!(config.openai.max_concurrency, 2);
        assert_eq!(config.summarizer.backend, ModelBackend::Local);
        assert_eq!(config.weaviate.batch_size, 100);
    }

    #[test]
    fn test_local_embedding_backend_model() {
        let mut config = Config::default_config();
        config.embedding.backend = ModelBackend::Local;
        assert_eq!(config.embedding.model_id(), LOCAL_EMBEDDING_MODEL);
        assert!(config.validate().is_ok());

        config.embedding.model = Some(HTTP_EMBEDDING_MODEL.to_string());
        assert!(matches!(config.validate(), Err(AskemError::Config(_))));

        config.embedding.backend = ModelBackend::Http;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let mut config = Config::default_config();
        config.openai.max_concurrency = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default_config();
        config.retriever.top_k = 0;
        assert!(config.validate().is_err());
    }
}
