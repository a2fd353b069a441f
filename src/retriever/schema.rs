// file: src/retriever/schema.rs
// description: passage class schema and schema lifecycle management
// reference: https://weaviate.io/developers/weaviate/config-refs/schema

use crate::error::Result;
use crate::retriever::client::WeaviateClient;
use serde_json::{Value, json};
use tracing::{info, warn};

const VECTORIZER: &str = "text2vec-transformers";

fn skipped(name: &str, data_type: &str) -> Value {
    json!({
        "name": name,
        "dataType": [data_type],
        "moduleConfig": { VECTORIZER: { "skip": true } },
    })
}

/// The v1 passage class. Only `text_content` is vectorized.
pub fn get_schema(class_name: &str) -> Value {
    let mut hashed_text = skipped("hashed_text", "text");
    hashed_text["description"] = json!("SHA256 hash of text_content");

    json!({
        "class": class_name,
        "description": "Paragraph chunk of a document",
        "vectorizer": VECTORIZER,
        "moduleConfig": { VECTORIZER: { "vectorizeClassName": false } },
        "vectorIndexConfig": { "distance": "dot" },
        "properties": [
            skipped("paper_id", "text"),
            skipped("preprocessor_id", "text"),
            skipped("doc_type", "text"),
            skipped("cosmos_object_id", "text"),
            skipped("topic", "text"),
            skipped("topic_list", "text[]"),
            hashed_text,
            { "name": "text_content", "dataType": ["text"] },
        ],
    })
}

pub struct SchemaManager<'a> {
    client: &'a WeaviateClient,
    class_name: &'a str,
}

impl<'a> SchemaManager<'a> {
    pub fn new(client: &'a WeaviateClient, class_name: &'a str) -> Self {
        Self { client, class_name }
    }

    /// Create the passage class.
    pub async fn init_retriever(&self) -> Result<()> {
        info!("Creating class {}", self.class_name);
        self.client.create_class(&get_schema(self.class_name)).await?;
        info!("Class {} created", self.class_name);
        Ok(())
    }

    pub async fn verify_schema(&self) -> Result<bool> {
        if self.client.class_exists(self.class_name).await? {
            info!("Class '{}' exists", self.class_name);
            Ok(true)
        } else {
            warn!("Class '{}' does not exist", self.class_name);
            Ok(false)
        }
    }

    /// Create the class if missing; with `force`, drop and recreate it.
    pub async fn ensure(&self, force: bool) -> Result<bool> {
        let exists = self.verify_schema().await?;

        if exists && force {
            warn!("Dropping class {} - all passages will be lost", self.class_name);
            self.client.delete_class(self.class_name).await?;
        } else if exists {
            return Ok(false);
        }

        self.init_retriever().await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_shape() {
        let schema = get_schema("Passage");

        assert_eq!(schema["class"], "Passage");
        assert_eq!(schema["vectorizer"], "text2vec-transformers");
        assert_eq!(schema["vectorIndexConfig"]["distance"], "dot");
        assert_eq!(
            schema["moduleConfig"]["text2vec-transformers"]["vectorizeClassName"],
            false
        );
    }

    #[test]
    fn test_only_text_content_is_vectorized() {
        let schema = get_schema("Passage");
        let properties = schema["properties"].as_array().unwrap();

        let vectorized: Vec<&str> = properties
            .iter()
            .filter(|p| p.get("moduleConfig").is_none())
            .filter_map(|p| p["name"].as_str())
            .collect();
        assert_eq!(vectorized, vec!["text_content"]);

        let topic_list = properties
            .iter()
            .find(|p| p["name"] == "topic_list")
            .unwrap();
        assert_eq!(topic_list["dataType"][0], "text[]");

        let hashed = properties
            .iter()
            .find(|p| p["name"] == "hashed_text")
            .unwrap();
        assert_eq!(hashed["description"], "SHA256 hash of text_content");
    }
}
