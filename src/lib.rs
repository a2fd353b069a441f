// file: src/lib.rs
// description: library entry point and public api exports
// reference: rust library patterns
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/readme.md"))]

pub mod config;
pub mod embedding;
pub mod error;
pub mod exporter;
pub mod llm;
pub mod models;
pub mod pipeline;
pub mod retriever;
pub mod server;
pub mod summarize;
pub mod utils;

pub use config::{
    Config, EmbeddingConfig, ModelBackend, OpenAiConfig, RetrieverConfig, ServerConfig,
    SummarizerConfig, WeaviateConfig,
};
pub use embedding::{Embedder, HttpEmbeddingClient, dot_score, mean_pooling, normalize};
pub use error::{AskemError, Result};
pub use exporter::{ExportManifest, JsonExporter};
pub use llm::{ChatClient, ChatMessage, compress, compress_all, get_answer};
pub use models::{Document, DocumentQuery, Passage};
pub use pipeline::{Answer, RagPipeline};
pub use retriever::{BatchImporter, ImportStats, Retriever, SchemaManager, WeaviateClient};
pub use summarize::{TextGenerator, prompt_sum, summarize};
pub use utils::{HealthReport, Validator};
