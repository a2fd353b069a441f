// file: src/llm/mod.rs
// description: hosted language model helpers module exports
// reference: internal module structure

pub mod chat;
pub mod tasks;

pub use chat::{ChatClient, ChatMessage, Role};
pub use tasks::{compress, compress_all, get_answer};
