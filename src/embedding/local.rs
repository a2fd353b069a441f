// file: src/embedding/local.rs
// description: in-process sentence embeddings with a candle BERT checkpoint
// reference: https://github.com/huggingface/candle/tree/main/candle-examples/examples/bert

use crate::embedding::Embedder;
use crate::embedding::pooling::{mean_pooling, normalize};
use crate::error::{AskemError, Result};
use async_trait::async_trait;
use candle_core::{Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config, DTYPE};
use hf_hub::api::sync::Api;
use std::sync::Arc;
use tokenizers::{PaddingParams, PaddingStrategy, Tokenizer, TruncationParams};
use tokio::sync::OnceCell;
use tracing::info;

fn model_err(e: impl std::fmt::Display) -> AskemError {
    AskemError::Model(e.to_string())
}

struct LoadedModel {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
}

impl LoadedModel {
    fn load(model_id: &str) -> Result<Self> {
        info!("Loading embedding model {} from HuggingFace Hub", model_id);

        let repo = Api::new().map_err(model_err)?.model(model_id.to_string());
        let config_path = repo.get("config.json").map_err(model_err)?;
        let tokenizer_path = repo.get("tokenizer.json").map_err(model_err)?;
        let weights_path = repo.get("model.safetensors").map_err(model_err)?;

        let raw_config: serde_json::Value =
            serde_json::from_reader(std::fs::File::open(&config_path)?)?;
        if raw_config["model_type"] != "bert" {
            return Err(AskemError::Model(format!(
                "{} is not a BERT checkpoint (model_type = {})",
                model_id, raw_config["model_type"]
            )));
        }
        let config: Config = serde_json::from_value(raw_config)?;

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path).map_err(model_err)?;
        tokenizer.with_padding(Some(PaddingParams {
            strategy: PaddingStrategy::BatchLongest,
            ..Default::default()
        }));
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: config.max_position_embeddings,
                ..Default::default()
            }))
            .map_err(model_err)?;

        let device = Device::Cpu;
        // SAFETY: the safetensors file is owned by the hub cache and not mutated while mapped.
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_path], DTYPE, &device)
                .map_err(model_err)?
        };
        let model = BertModel::load(vb, &config).map_err(model_err)?;

        info!(
            "Embedding model loaded: {} dims, {} layers",
            config.hidden_size, config.num_hidden_layers
        );

        Ok(Self {
            model,
            tokenizer,
            device,
        })
    }

    fn embed(&self, sentences: Vec<String>) -> Result<Vec<Vec<f32>>> {
        let encodings = self
            .tokenizer
            .encode_batch(sentences, true)
            .map_err(model_err)?;

        let batch = encodings.len();
        let seq_len = encodings.first().map_or(0, |e| e.get_ids().len());

        let ids: Vec<u32> = encodings.iter().flat_map(|e| e.get_ids().to_vec()).collect();
        let masks: Vec<Vec<u32>> = encodings
            .iter()
            .map(|e| e.get_attention_mask().to_vec())
            .collect();
        let flat_mask: Vec<u32> = masks.iter().flatten().copied().collect();

        let input_ids = Tensor::from_vec(ids, (batch, seq_len), &self.device).map_err(model_err)?;
        let attention_mask =
            Tensor::from_vec(flat_mask, (batch, seq_len), &self.device).map_err(model_err)?;
        let token_type_ids = input_ids.zeros_like().map_err(model_err)?;

        let hidden = self
            .model
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))
            .map_err(model_err)?
            .to_vec3::<f32>()
            .map_err(model_err)?;

        Ok(hidden
            .iter()
            .zip(&masks)
            .map(|(tokens, mask)| normalize(&mean_pooling(tokens, mask)))
            .collect())
    }
}

/// Sentence-transformers style embedder. Weights load on first use.
pub struct SentenceEmbedder {
    model_id: String,
    loaded: OnceCell<Arc<LoadedModel>>,
}

impl SentenceEmbedder {
    pub fn new(model_id: &str) -> Self {
        Self {
            model_id: model_id.to_string(),
            loaded: OnceCell::new(),
        }
    }

    async fn model(&self) -> Result<Arc<LoadedModel>> {
        let loaded = self
            .loaded
            .get_or_try_init(|| async {
                let model_id = self.model_id.clone();
                tokio::task::spawn_blocking(move || LoadedModel::load(&model_id))
                    .await
                    .map_err(model_err)?
                    .map(Arc::new)
            })
            .await?;
        Ok(Arc::clone(loaded))
    }
}

#[async_trait]
impl Embedder for SentenceEmbedder {
    async fn embed(&self, sentences: &[String]) -> Result<Vec<Vec<f32>>> {
        if sentences.is_empty() {
            return Ok(Vec::new());
        }

        let model = self.model().await?;
        let sentences = sentences.to_vec();

        tokio::task::spawn_blocking(move || model.embed(sentences))
            .await
            .map_err(model_err)?
    }
}
