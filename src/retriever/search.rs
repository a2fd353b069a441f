// file: src/retriever/search.rs
// description: semantic passage retrieval with filtering and concept movement
// reference: https://weaviate.io/developers/weaviate/search/similarity

use crate::error::{AskemError, Result};
use crate::models::{DEFAULT_TOP_K, Document, DocumentQuery};
use crate::retriever::client::WeaviateClient;
use crate::retriever::filter::{GetQuery, Movement, NearText, Operand, WhereFilter};
use serde_json::Value;
use tracing::{debug, info};

pub const OUTPUT_FIELDS: [&str; 6] = [
    "paper_id",
    "cosmos_object_id",
    "preprocessor_id",
    "topic",
    "doc_type",
    "text_content",
];

#[derive(Clone)]
pub struct Retriever {
    client: WeaviateClient,
    class_name: String,
    default_top_k: usize,
}

impl Retriever {
    pub fn new(client: WeaviateClient, class_name: impl Into<String>) -> Self {
        Self {
            client,
            class_name: class_name.into(),
            default_top_k: DEFAULT_TOP_K,
        }
    }

    /// Limit applied to queries that do not set `top_k`.
    pub fn with_default_top_k(mut self, top_k: usize) -> Self {
        self.default_top_k = top_k;
        self
    }

    pub fn client(&self) -> &WeaviateClient {
        &self.client
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Ask the retriever a question and return the most relevant passages.
    ///
    /// Fails with [`AskemError::Query`] when the database reports errors and
    /// with [`AskemError::NoResults`] when nothing matched.
    pub async fn get_documents(&self, query: &DocumentQuery) -> Result<Vec<Document>> {
        query.validate()?;

        let graphql = self.build_query(query).build();
        let body = self.client.graphql(&graphql).await?;

        debug!("results={}", body);

        let documents = parse_response(&self.class_name, &body)?;
        info!("Retrieved {} results", documents.len());
        Ok(documents)
    }

    pub fn build_query(&self, query: &DocumentQuery) -> GetQuery {
        let mut get = GetQuery::new(&self.class_name, &OUTPUT_FIELDS).with_additional(&["distance"]);

        let mut where_filter = WhereFilter::default();

        if let Some(topic) = &query.topic {
            info!("Filtering by topic: {}", topic);
            where_filter.push(Operand::equal("topic", topic.as_str()));
        }

        if let Some(doc_type) = &query.doc_type {
            info!("Filtering by doc_type: {}", doc_type);
            where_filter.push(Operand::equal("doc_type", doc_type.as_str()));
        }

        if let Some(preprocessor_id) = &query.preprocessor_id {
            info!("Filtering by preprocessor_id: {}", preprocessor_id);
            where_filter.push(Operand::equal("preprocessor_id", preprocessor_id.as_str()));
        }

        if let Some(paper_ids) = &query.paper_ids {
            info!("Filtering by paper_ids: {:?}", paper_ids);
            where_filter.push(Operand::contains_any("paper_id", paper_ids.clone()));
        }

        if !where_filter.is_empty() {
            get = get.with_where(where_filter);
        }

        let mut near_text = NearText::new(query.question.as_str());
        near_text.distance = query.distance;

        debug!("near_text_query={:?}", near_text);

        if let Some(move_to) = &query.move_to {
            debug!("Moving towards {} with weight {}", move_to, query.move_to_weight);
            near_text.move_to = Some(Movement {
                concepts: vec![move_to.clone()],
                force: query.move_to_weight,
            });
        }

        if let Some(move_away_from) = &query.move_away_from {
            debug!(
                "Moving away from {} with weight {}",
                move_away_from, query.move_away_from_weight
            );
            near_text.move_away_from = Some(Movement {
                concepts: vec![move_away_from.clone()],
                force: query.move_away_from_weight,
            });
        }

        let limit = query.top_k.unwrap_or(self.default_top_k);
        get.with_near_text(near_text).with_limit(limit)
    }
}

/// Reshape a `Get` response body into documents.
pub fn parse_response(class_name: &str, body: &Value) -> Result<Vec<Document>> {
    if let Some(errors) = body.get("errors") {
        return Err(AskemError::Query(errors.clone()));
    }

    let hits = body
        .get("data")
        .and_then(|data| data.get("Get"))
        .and_then(|get| get.get(class_name))
        .and_then(Value::as_array)
        .filter(|hits| !hits.is_empty());

    let Some(hits) = hits else {
        info!("No results found");
        return Err(AskemError::NoResults(body.to_string()));
    };

    hits.iter().map(Document::from_hit).collect()
}
