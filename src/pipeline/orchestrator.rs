// file: src/pipeline/orchestrator.rs
// description: coordinates retrieval, context compression, answering and summarization
// reference: orchestrates the retrieval-augmented generation workflow

use crate::config::Config;
use crate::embedding::{self, Embedder};
use crate::error::{AskemError, Result};
use crate::llm::{self, ChatClient};
use crate::models::{Document, DocumentQuery};
use crate::retriever::{Retriever, WeaviateClient};
use crate::summarize::{self, TextGenerator};
use crate::utils::{HealthCheck, HealthReport, Validator};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub answer: String,
    pub documents: Vec<Document>,
}

/// Join passage texts into one context block for the answering prompt.
pub fn build_context(texts: &[String]) -> String {
    let mut context = texts.join("\n\n");
    context.push_str("\n\n");
    context
}

pub struct RagPipeline {
    retriever: Retriever,
    chat: Option<ChatClient>,
    embedder: Arc<dyn Embedder>,
    generator: Option<Arc<dyn TextGenerator>>,
}

impl RagPipeline {
    pub fn new(
        retriever: Retriever,
        chat: Option<ChatClient>,
        embedder: Arc<dyn Embedder>,
        generator: Option<Arc<dyn TextGenerator>>,
    ) -> Self {
        Self {
            retriever,
            chat,
            embedder,
            generator,
        }
    }

    /// Wire every component from configuration. Missing model credentials
    /// only disable the features that need them.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = WeaviateClient::new(&config.weaviate)?;
        let retriever = Retriever::new(client, config.weaviate.class_name.clone())
            .with_default_top_k(config.retriever.top_k);

        let chat = match ChatClient::new(&config.openai) {
            Ok(chat) => Some(chat),
            Err(e) => {
                warn!("Chat completions disabled: {}", e);
                None
            }
        };

        let embedder = embedding::build_embedder(&config.embedding)?;

        let generator = match summarize::build_generator(&config.summarizer, chat.clone()) {
            Ok(generator) => Some(generator),
            Err(e) => {
                warn!("Summarization disabled: {}", e);
                None
            }
        };

        Ok(Self::new(retriever, chat, embedder, generator))
    }

    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    fn chat(&self) -> Result<&ChatClient> {
        self.chat.as_ref().ok_or_else(|| {
            AskemError::Config("chat completion API key is not set (OPENAI_API_KEY)".to_string())
        })
    }

    fn generator(&self) -> Result<&dyn TextGenerator> {
        self.generator
            .as_deref()
            .ok_or_else(|| AskemError::Config("no summarization backend available".to_string()))
    }

    pub async fn search(&self, query: &DocumentQuery) -> Result<Vec<Document>> {
        self.retriever.get_documents(query).await
    }

    pub async fn compress(&self, chunks: &[String]) -> Result<Vec<String>> {
        Validator::validate_not_empty(chunks, "chunks")?;
        llm::compress_all(self.chat()?, chunks).await
    }

    /// Retrieve passages for the question, optionally compress each one, and
    /// answer over the combined context.
    pub async fn answer(&self, query: &DocumentQuery, compress: bool) -> Result<Answer> {
        let chat = self.chat()?;
        let documents = self.search(query).await?;

        let texts: Vec<String> = documents.iter().map(|d| d.text.clone()).collect();
        let texts = if compress {
            llm::compress_all(chat, &texts).await?
        } else {
            texts
        };

        info!(
            "Answering over {} passages (compressed: {})",
            texts.len(),
            compress
        );

        let answer = llm::get_answer(chat, &build_context(&texts), &query.question).await?;
        Ok(Answer { answer, documents })
    }

    pub async fn summarize(&self, sentences: &[String], question: Option<&str>) -> Result<String> {
        Validator::validate_not_empty(sentences, "sentences")?;
        let generator = self.generator()?;

        match question {
            Some(question) => summarize::prompt_sum(generator, &sentences.join(" "), question).await,
            None => summarize::summarize(generator, sentences).await,
        }
    }

    pub async fn embed(&self, sentences: &[String]) -> Result<Vec<Vec<f32>>> {
        Validator::validate_not_empty(sentences, "sentences")?;
        embedding::to_embeddings(self.embedder.as_ref(), sentences).await
    }

    pub async fn similarity(&self, query: &str, sentences: &[String]) -> Result<Vec<f32>> {
        Validator::validate_not_empty(sentences, "sentences")?;
        embedding::similarity(self.embedder.as_ref(), query, sentences).await
    }

    pub async fn health(&self) -> HealthReport {
        HealthReport::new(vec![
            HealthCheck::weaviate(self.retriever.client()).await,
            HealthCheck::configured("chat", self.chat.is_some()),
            HealthCheck::configured("summarizer", self.generator.is_some()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_context() {
        let texts = vec!["First passage.".to_string(), "Second passage.".to_string()];
        assert_eq!(
            build_context(&texts),
            "First passage.\n\nSecond passage.\n\n"
        );
    }
}
