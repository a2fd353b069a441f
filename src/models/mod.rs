// file: src/models/mod.rs
// description: data models module exports
// reference: internal module structure

pub mod document;
pub mod passage;
pub mod query;

pub use document::Document;
pub use passage::Passage;
pub use query::{DEFAULT_TOP_K, DocumentQuery};
