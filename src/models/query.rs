// file: src/models/query.rs
// description: retrieval request parameters with defaults and validation
// reference: internal data structures

use crate::error::{AskemError, Result};
use serde::{Deserialize, Serialize};

/// Result count used when a query leaves `top_k` unset.
pub const DEFAULT_TOP_K: usize = 5;

fn default_weight() -> f64 {
    1.0
}

/// Parameters for a semantic passage lookup.
///
/// Every filter is optional; an absent filter is not sent to the database.
/// An absent `top_k` falls back to the retriever's configured default.
/// `move_to` / `move_away_from` shift the query vector towards or away from
/// an extra concept, weighted by a force in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentQuery {
    pub question: String,
    #[serde(default)]
    pub top_k: Option<usize>,
    #[serde(default)]
    pub distance: Option<f64>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub doc_type: Option<String>,
    #[serde(default)]
    pub preprocessor_id: Option<String>,
    #[serde(default)]
    pub paper_ids: Option<Vec<String>>,
    #[serde(default)]
    pub move_to: Option<String>,
    #[serde(default = "default_weight")]
    pub move_to_weight: f64,
    #[serde(default)]
    pub move_away_from: Option<String>,
    #[serde(default = "default_weight")]
    pub move_away_from_weight: f64,
}

impl DocumentQuery {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            top_k: None,
            distance: None,
            topic: None,
            doc_type: None,
            preprocessor_id: None,
            paper_ids: None,
            move_to: None,
            move_to_weight: default_weight(),
            move_away_from: None,
            move_away_from_weight: default_weight(),
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = Some(top_k);
        self
    }

    pub fn with_distance(mut self, distance: f64) -> Self {
        self.distance = Some(distance);
        self
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    pub fn with_doc_type(mut self, doc_type: impl Into<String>) -> Self {
        self.doc_type = Some(doc_type.into());
        self
    }

    pub fn with_preprocessor_id(mut self, preprocessor_id: impl Into<String>) -> Self {
        self.preprocessor_id = Some(preprocessor_id.into());
        self
    }

    pub fn with_paper_ids(mut self, paper_ids: Vec<String>) -> Self {
        self.paper_ids = Some(paper_ids);
        self
    }

    pub fn with_move_to(mut self, concept: impl Into<String>, weight: f64) -> Self {
        self.move_to = Some(concept.into());
        self.move_to_weight = weight;
        self
    }

    pub fn with_move_away_from(mut self, concept: impl Into<String>, weight: f64) -> Self {
        self.move_away_from = Some(concept.into());
        self.move_away_from_weight = weight;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.question.trim().is_empty() {
            return Err(AskemError::Validation("question must not be empty".to_string()));
        }

        if self.top_k == Some(0) {
            return Err(AskemError::Validation(
                "top_k must be greater than 0".to_string(),
            ));
        }

        if let Some(distance) = self.distance
            && !distance.is_finite()
        {
            return Err(AskemError::Validation(format!(
                "distance must be a finite number, got {}",
                distance
            )));
        }

        for (name, weight) in [
            ("move_to_weight", self.move_to_weight),
            ("move_away_from_weight", self.move_away_from_weight),
        ] {
            if !(0.0..=1.0).contains(&weight) {
                return Err(AskemError::Validation(format!(
                    "{} must be within 0-1, got {}",
                    name, weight
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_applies_defaults() {
        let query: DocumentQuery = serde_json::from_value(json!({"question": "q"})).unwrap();
        assert_eq!(query, DocumentQuery::new("q"));
        assert_eq!(query.top_k, None);
        assert_eq!(query.move_to_weight, 1.0);
        assert_eq!(query.move_away_from_weight, 1.0);
    }

    #[test]
    fn test_builder() {
        let query = DocumentQuery::new("what is sars")
            .with_top_k(3)
            .with_topic("covid")
            .with_paper_ids(vec!["a".into(), "b".into()])
            .with_move_to("vaccine", 0.5);

        assert_eq!(query.top_k, Some(3));
        assert_eq!(query.topic.as_deref(), Some("covid"));
        assert_eq!(query.paper_ids.as_ref().map(Vec::len), Some(2));
        assert_eq!(query.move_to_weight, 0.5);
    }

    #[test]
    fn test_validate() {
        assert!(DocumentQuery::new("q").validate().is_ok());
        assert!(DocumentQuery::new("  ").validate().is_err());
        assert!(DocumentQuery::new("q").with_top_k(0).validate().is_err());
        assert!(DocumentQuery::new("q").with_move_to("x", 1.5).validate().is_err());
        assert!(
            DocumentQuery::new("q")
                .with_move_away_from("x", -0.1)
                .validate()
                .is_err()
        );
        assert!(DocumentQuery::new("q").with_distance(f64::NAN).validate().is_err());
    }
}
