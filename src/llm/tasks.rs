// file: src/llm/tasks.rs
// description: context compression and question answering over chat completions
// reference: https://platform.openai.com/docs/guides/text-generation

use crate::error::Result;
use crate::llm::chat::{ChatClient, ChatMessage};
use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::info;

pub const COMPRESS_INSTRUCTION: &str = "Summarize the upcoming passage into key points precisely.";

pub const ANSWER_INSTRUCTION: &str =
    "Study the upcoming passage carefully and answer the questions that follows.";

pub fn compress_messages(chunk: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(COMPRESS_INSTRUCTION),
        ChatMessage::user(chunk),
    ]
}

pub fn answer_messages(context: &str, question: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(ANSWER_INSTRUCTION),
        ChatMessage::user(format!("{}Do you understand the passage?", context)),
        ChatMessage::user(format!(
            "{} Provide your answer in a precise and concise manner.",
            question
        )),
    ]
}

/// Compress a long text into its key points.
pub async fn compress(client: &ChatClient, chunk: &str) -> Result<String> {
    client.complete(&compress_messages(chunk)).await
}

/// Compress every chunk concurrently. Output order follows input order and
/// the first failure aborts the batch.
pub async fn compress_all(client: &ChatClient, chunks: &[String]) -> Result<Vec<String>> {
    info!(
        "Compressing {} chunks with up to {} concurrent requests",
        chunks.len(),
        client.max_concurrency()
    );

    let requests: Vec<_> = chunks.iter().map(|chunk| compress(client, chunk)).collect();

    stream::iter(requests)
        .buffered(client.max_concurrency())
        .try_collect()
        .await
}

/// Answer a question given a context.
pub async fn get_answer(client: &ChatClient, context: &str, question: &str) -> Result<String> {
    client.complete(&answer_messages(context, question)).await
}
