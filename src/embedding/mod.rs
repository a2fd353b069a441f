// file: src/embedding/mod.rs
// description: sentence embedding backends and vector scoring
// reference: internal module structure

pub mod http;
#[cfg(feature = "local-models")]
pub mod local;
pub mod pooling;

use crate::config::{EmbeddingConfig, ModelBackend};
use crate::error::{AskemError, Result};
use async_trait::async_trait;
use std::sync::Arc;

pub use http::HttpEmbeddingClient;
#[cfg(feature = "local-models")]
pub use local::SentenceEmbedder;
pub use pooling::{dot, dot_score, mean_pooling, normalize};

/// Turns sentences into unit-length embeddings, one per sentence.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, sentences: &[String]) -> Result<Vec<Vec<f32>>>;
}

pub fn build_embedder(config: &EmbeddingConfig) -> Result<Arc<dyn Embedder>> {
    match config.backend {
        ModelBackend::Http => Ok(Arc::new(HttpEmbeddingClient::new(config)?)),
        #[cfg(feature = "local-models")]
        ModelBackend::Local => Ok(Arc::new(SentenceEmbedder::new(config.model_id()))),
        #[cfg(not(feature = "local-models"))]
        ModelBackend::Local => Err(AskemError::Config(
            "local embeddings require the `local-models` feature".to_string(),
        )),
    }
}

pub async fn to_embeddings(embedder: &dyn Embedder, sentences: &[String]) -> Result<Vec<Vec<f32>>> {
    embedder.embed(sentences).await
}

/// Score each sentence against the query with the dot product of their embeddings.
pub async fn similarity(
    embedder: &dyn Embedder,
    query: &str,
    sentences: &[String],
) -> Result<Vec<f32>> {
    let query_embedding = embedder.embed(&[query.to_string()]).await?;
    let sentence_embeddings = embedder.embed(sentences).await?;

    dot_score(&query_embedding, &sentence_embeddings)
        .into_iter()
        .next()
        .ok_or_else(|| AskemError::Model("embedder returned no query vector".to_string()))
}
