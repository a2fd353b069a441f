// file: src/summarize/mod.rs
// description: prompt-based summarization over hosted or local text generators
// reference: internal module structure

#[cfg(feature = "local-models")]
pub mod seq2seq;

use crate::config::{ModelBackend, SummarizerConfig};
use crate::error::{AskemError, Result};
use crate::llm::{ChatClient, ChatMessage};
use async_trait::async_trait;
use std::sync::Arc;

#[cfg(feature = "local-models")]
pub use seq2seq::Seq2SeqGenerator;

/// Produces text from a single prompt.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

#[async_trait]
impl TextGenerator for ChatClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.complete(&[ChatMessage::user(prompt)]).await
    }
}

/// Pick the configured generator. The hosted backend needs a chat client.
pub fn build_generator(
    config: &SummarizerConfig,
    chat: Option<ChatClient>,
) -> Result<Arc<dyn TextGenerator>> {
    match config.backend {
        ModelBackend::Http => chat
            .map(|c| Arc::new(c) as Arc<dyn TextGenerator>)
            .ok_or_else(|| {
                AskemError::Config(
                    "hosted summarization requires a chat completion API key".to_string(),
                )
            }),
        #[cfg(feature = "local-models")]
        ModelBackend::Local => Ok(Arc::new(Seq2SeqGenerator::new(config))),
        #[cfg(not(feature = "local-models"))]
        ModelBackend::Local => Err(AskemError::Config(
            "local summarization requires the `local-models` feature".to_string(),
        )),
    }
}

pub fn summarize_prompt(sentences: &[String]) -> String {
    format!("summarize: {}", sentences.join("."))
}

pub fn question_prompt(text: &str, question: &str) -> String {
    format!(
        "Based on the following context answer this question: {} Context: {}",
        question, text
    )
}

pub async fn summarize(generator: &dyn TextGenerator, sentences: &[String]) -> Result<String> {
    generator.generate(&summarize_prompt(sentences)).await
}

/// Summarize `text` with respect to a question.
pub async fn prompt_sum(generator: &dyn TextGenerator, text: &str, question: &str) -> Result<String> {
    generator.generate(&question_prompt(text, question)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl TextGenerator for Recorder {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok("ok".to_string())
        }
    }

    #[tokio::test]
    async fn test_summarize_joins_with_periods() {
        let recorder = Recorder::default();
        let sentences = vec!["One".to_string(), "Two".to_string()];

        assert_eq!(summarize(&recorder, &sentences).await.unwrap(), "ok");
        assert_eq!(recorder.prompts.lock().unwrap()[0], "summarize: One.Two");
    }

    #[tokio::test]
    async fn test_prompt_sum_template() {
        let recorder = Recorder::default();
        prompt_sum(&recorder, "Cats purr.", "Do cats purr?").await.unwrap();

        assert_eq!(
            recorder.prompts.lock().unwrap()[0],
            "Based on the following context answer this question: Do cats purr? Context: Cats purr."
        );
    }

    #[test]
    fn test_hosted_backend_needs_chat_client() {
        let config = SummarizerConfig::default();
        assert!(matches!(
            build_generator(&config, None),
            Err(AskemError::Config(_))
        ));
    }
}
