// file: src/models/document.rs
// description: retrieved passage model built from vector search hits
// reference: https://weaviate.io/developers/weaviate/api/graphql/get

use crate::error::{AskemError, Result};
use serde::{Deserialize, Serialize};

/// A passage returned by the retriever.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub paper_id: String,
    pub topic: Option<String>,
    pub cosmos_object_id: String,
    pub doc_type: String,
    pub text: String,
    pub distance: f64,
}

#[derive(Debug, Deserialize)]
struct PassageHit {
    paper_id: String,
    #[serde(default)]
    topic: Option<String>,
    cosmos_object_id: String,
    doc_type: String,
    text_content: String,
    #[serde(rename = "_additional")]
    additional: Additional,
}

#[derive(Debug, Deserialize)]
struct Additional {
    distance: f64,
}

impl Document {
    /// Convert one `Get.<Class>` hit into a `Document`.
    pub fn from_hit(hit: &serde_json::Value) -> Result<Self> {
        let hit = PassageHit::deserialize(hit)
            .map_err(|e| AskemError::invalid_response("weaviate", format!("bad passage: {}", e)))?;

        Ok(Self {
            paper_id: hit.paper_id,
            topic: hit.topic,
            cosmos_object_id: hit.cosmos_object_id,
            doc_type: hit.doc_type,
            text: hit.text_content,
            distance: hit.additional.distance,
        })
    }

    pub fn format_summary(&self, max_content_len: usize) -> String {
        let preview = crate::utils::Validator::truncate_text(&self.text, max_content_len);

        format!(
            "Distance: {:.4} | {} [{}] {}\n{}\n",
            self.distance,
            self.paper_id,
            self.doc_type,
            self.topic.as_deref().unwrap_or("-"),
            preview
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_hit() {
        let hit = json!({
            "paper_id": "5f3c",
            "topic": "covid",
            "cosmos_object_id": "obj-1",
            "preprocessor_id": "haystack_v0.0.2",
            "doc_type": "paragraph",
            "text_content": "Masks reduce transmission.",
            "_additional": {"distance": 0.12}
        });

        let doc = Document::from_hit(&hit).unwrap();
        assert_eq!(doc.paper_id, "5f3c");
        assert_eq!(doc.topic.as_deref(), Some("covid"));
        assert_eq!(doc.text, "Masks reduce transmission.");
        assert_eq!(doc.distance, 0.12);
    }

    #[test]
    fn test_from_hit_null_topic() {
        let hit = json!({
            "paper_id": "p",
            "topic": null,
            "cosmos_object_id": "o",
            "doc_type": "figure",
            "text_content": "caption",
            "_additional": {"distance": 0.5}
        });

        assert_eq!(Document::from_hit(&hit).unwrap().topic, None);
    }

    #[test]
    fn test_from_hit_missing_distance() {
        let hit = json!({
            "paper_id": "p",
            "cosmos_object_id": "o",
            "doc_type": "figure",
            "text_content": "caption"
        });

        assert!(matches!(
            Document::from_hit(&hit),
            Err(AskemError::InvalidResponse { .. })
        ));
    }

    #[test]
    fn test_format_summary() {
        let doc = Document {
            paper_id: "paper".to_string(),
            topic: None,
            cosmos_object_id: "obj".to_string(),
            doc_type: "paragraph".to_string(),
            text: "This is a long passage that will be cut".to_string(),
            distance: 0.25,
        };

        let summary = doc.format_summary(10);
        assert!(summary.contains("0.2500"));
        assert!(summary.contains("paper"));
        assert!(summary.contains("..."));
    }
}
