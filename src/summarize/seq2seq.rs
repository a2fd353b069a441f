// file: src/summarize/seq2seq.rs
// description: in-process T5-family text generation with greedy decoding
// reference: https://github.com/huggingface/candle/tree/main/candle-examples/examples/t5

use crate::config::SummarizerConfig;
use crate::error::{AskemError, Result};
use crate::summarize::TextGenerator;
use async_trait::async_trait;
use candle_core::{D, DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::t5::{Config, T5ForConditionalGeneration};
use hf_hub::api::sync::Api;
use std::sync::{Arc, Mutex};
use tokenizers::{Tokenizer, TruncationParams};
use tokio::sync::OnceCell;
use tracing::{debug, info};

fn model_err(e: impl std::fmt::Display) -> AskemError {
    AskemError::Model(e.to_string())
}

struct LoadedModel {
    model: Mutex<T5ForConditionalGeneration>,
    tokenizer: Tokenizer,
    config: Config,
    device: Device,
}

impl LoadedModel {
    fn load(model_id: &str, max_input_tokens: usize) -> Result<Self> {
        info!("Loading seq2seq model {} from HuggingFace Hub", model_id);

        let repo = Api::new().map_err(model_err)?.model(model_id.to_string());
        let config_path = repo.get("config.json").map_err(model_err)?;
        let tokenizer_path = repo.get("tokenizer.json").map_err(model_err)?;
        let weights_path = repo.get("model.safetensors").map_err(model_err)?;

        let config: Config = serde_json::from_reader(std::fs::File::open(&config_path)?)?;

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path).map_err(model_err)?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: max_input_tokens,
                ..Default::default()
            }))
            .map_err(model_err)?;

        let device = Device::Cpu;
        // SAFETY: the safetensors file is owned by the hub cache and not mutated while mapped.
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, &device)
                .map_err(model_err)?
        };
        let model = T5ForConditionalGeneration::load(vb, &config).map_err(model_err)?;

        Ok(Self {
            model: Mutex::new(model),
            tokenizer,
            config,
            device,
        })
    }

    fn generate(&self, prompt: &str, max_new_tokens: usize) -> Result<String> {
        let encoding = self.tokenizer.encode(prompt, true).map_err(model_err)?;
        let input_ids = Tensor::new(encoding.get_ids(), &self.device)
            .and_then(|t| t.unsqueeze(0))
            .map_err(model_err)?;

        let mut model = self
            .model
            .lock()
            .map_err(|_| AskemError::Model("seq2seq model lock poisoned".to_string()))?;
        model.clear_kv_cache();

        let encoder_output = model.encode(&input_ids).map_err(model_err)?;

        let start = self
            .config
            .decoder_start_token_id
            .unwrap_or(self.config.pad_token_id) as u32;
        let mut output_ids = vec![start];

        for step in 0..max_new_tokens {
            let decoder_input = if step == 0 || !self.config.use_cache {
                Tensor::new(output_ids.as_slice(), &self.device)
            } else {
                Tensor::new(&output_ids[output_ids.len() - 1..], &self.device)
            }
            .and_then(|t| t.unsqueeze(0))
            .map_err(model_err)?;

            let next = model
                .decode(&decoder_input, &encoder_output)
                .and_then(|logits| logits.squeeze(0))
                .and_then(|logits| logits.argmax(D::Minus1))
                .and_then(|token| token.to_scalar::<u32>())
                .map_err(model_err)?;

            if next as usize == self.config.eos_token_id {
                break;
            }
            output_ids.push(next);
        }

        debug!("Generated {} tokens", output_ids.len() - 1);

        self.tokenizer
            .decode(&output_ids[1..], true)
            .map_err(model_err)
    }
}

/// Local seq2seq generator (T5, mT5, flan-T5). Weights load on first use.
pub struct Seq2SeqGenerator {
    model_id: String,
    max_input_tokens: usize,
    max_new_tokens: usize,
    loaded: OnceCell<Arc<LoadedModel>>,
}

impl Seq2SeqGenerator {
    pub fn new(config: &SummarizerConfig) -> Self {
        Self {
            model_id: config.model.clone(),
            max_input_tokens: config.max_input_tokens,
            max_new_tokens: config.max_new_tokens,
            loaded: OnceCell::new(),
        }
    }

    async fn model(&self) -> Result<Arc<LoadedModel>> {
        let loaded = self
            .loaded
            .get_or_try_init(|| async {
                let model_id = self.model_id.clone();
                let max_input_tokens = self.max_input_tokens;
                tokio::task::spawn_blocking(move || LoadedModel::load(&model_id, max_input_tokens))
                    .await
                    .map_err(model_err)?
                    .map(Arc::new)
            })
            .await?;
        Ok(Arc::clone(loaded))
    }
}

#[async_trait]
impl TextGenerator for Seq2SeqGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let model = self.model().await?;
        let prompt = prompt.to_string();
        let max_new_tokens = self.max_new_tokens;

        tokio::task::spawn_blocking(move || model.generate(&prompt, max_new_tokens))
            .await
            .map_err(model_err)?
    }
}
