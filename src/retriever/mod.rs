// file: src/retriever/mod.rs
// description: vector database retrieval module exports
// reference: internal module structure

pub mod client;
pub mod filter;
pub mod import;
pub mod schema;
pub mod search;

pub use client::{BatchOutcome, WeaviateClient};
pub use filter::{GetQuery, Movement, NearText, Operand, Operator, WhereFilter};
pub use import::{BatchImporter, ImportStats};
pub use schema::{SchemaManager, get_schema};
pub use search::{OUTPUT_FIELDS, Retriever, parse_response};
