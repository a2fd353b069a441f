// file: src/models/passage.rs
// description: ingestable passage model with content hash and deterministic object id
// reference: internal data structures

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// A passage as it is stored in the vector database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    pub paper_id: String,
    pub preprocessor_id: String,
    pub doc_type: String,
    pub cosmos_object_id: String,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub topic_list: Vec<String>,
    pub text_content: String,
    #[serde(default)]
    pub hashed_text: String,
}

impl Passage {
    pub fn new(
        paper_id: String,
        preprocessor_id: String,
        doc_type: String,
        cosmos_object_id: String,
        text_content: String,
    ) -> Self {
        let hashed_text = Self::compute_hash(&text_content);

        Self {
            paper_id,
            preprocessor_id,
            doc_type,
            cosmos_object_id,
            topic: None,
            topic_list: Vec::new(),
            text_content,
            hashed_text,
        }
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        let topic = topic.into();
        if !self.topic_list.contains(&topic) {
            self.topic_list.push(topic.clone());
        }
        self.topic = Some(topic);
        self
    }

    /// Recompute `hashed_text`; records read from disk may carry a stale or empty hash.
    pub fn rehash(&mut self) {
        self.hashed_text = Self::compute_hash(&self.text_content);
    }

    pub fn compute_hash(content: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Same paper and same text always map to the same object id.
    pub fn object_id(&self) -> Uuid {
        let name = format!("{}:{}", self.paper_id, self.hashed_text);
        Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Passage {
        Passage::new(
            "paper-1".to_string(),
            "haystack_v0.0.2".to_string(),
            "paragraph".to_string(),
            "obj-1".to_string(),
            "Some passage text".to_string(),
        )
    }

    #[test]
    fn test_passage_creation() {
        let passage = sample();
        assert_eq!(passage.hashed_text.len(), 64);
        assert!(passage.topic.is_none());
    }

    #[test]
    fn test_hash_consistency() {
        assert_eq!(Passage::compute_hash("abc"), Passage::compute_hash("abc"));
        assert_eq!(
            Passage::compute_hash("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_object_id_deterministic() {
        let a = sample();
        let b = sample();
        assert_eq!(a.object_id(), b.object_id());

        let mut c = sample();
        c.text_content = "Other text".to_string();
        c.rehash();
        assert_ne!(a.object_id(), c.object_id());
    }

    #[test]
    fn test_with_topic() {
        let passage = sample().with_topic("covid").with_topic("covid");
        assert_eq!(passage.topic.as_deref(), Some("covid"));
        assert_eq!(passage.topic_list, vec!["covid".to_string()]);
    }
}
