// file: src/retriever/import.rs
// description: batched passage import from jsonl with progress reporting
// reference: https://weaviate.io/developers/weaviate/manage-data/import

use crate::error::{AskemError, Result};
use crate::models::Passage;
use crate::retriever::client::WeaviateClient;
use crate::utils::{OperationTimer, PerformanceMetrics};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::{Value, json};
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportStats {
    pub passages_read: usize,
    pub inserted: usize,
    pub failed: usize,
    pub skipped_lines: usize,
}

impl ImportStats {
    pub fn success_rate(&self) -> f64 {
        let total = self.inserted + self.failed;
        if total == 0 {
            return 0.0;
        }
        (self.inserted as f64 / total as f64) * 100.0
    }
}

pub struct BatchImporter<'a> {
    client: &'a WeaviateClient,
    class_name: &'a str,
    batch_size: usize,
    show_progress: bool,
}

impl<'a> BatchImporter<'a> {
    pub fn new(client: &'a WeaviateClient, class_name: &'a str, batch_size: usize) -> Self {
        Self {
            client,
            class_name,
            batch_size: batch_size.max(1),
            show_progress: true,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Build the batch object for one passage.
    pub fn to_object(&self, passage: &Passage) -> Value {
        json!({
            "class": self.class_name,
            "id": passage.object_id().to_string(),
            "properties": {
                "paper_id": passage.paper_id,
                "preprocessor_id": passage.preprocessor_id,
                "doc_type": passage.doc_type,
                "cosmos_object_id": passage.cosmos_object_id,
                "topic": passage.topic,
                "topic_list": passage.topic_list,
                "hashed_text": passage.hashed_text,
                "text_content": passage.text_content,
            },
        })
    }

    pub async fn import_file(&self, path: &Path) -> Result<ImportStats> {
        let content = std::fs::read_to_string(path)?;
        let (passages, skipped_lines) = parse_jsonl(&content);

        if passages.is_empty() {
            return Err(AskemError::Validation(format!(
                "No passages found in {}",
                path.display()
            )));
        }

        let mut stats = self.import(&passages).await?;
        stats.skipped_lines = skipped_lines;
        Ok(stats)
    }

    pub async fn import(&self, passages: &[Passage]) -> Result<ImportStats> {
        let timer = OperationTimer::new("passage import");
        let bar = self.progress_bar(passages.len() as u64);

        let mut stats = ImportStats {
            passages_read: passages.len(),
            ..ImportStats::default()
        };

        for chunk in passages.chunks(self.batch_size) {
            let objects: Vec<Value> = chunk.iter().map(|p| self.to_object(p)).collect();
            let outcome = self.client.batch_objects(&objects).await?;

            for (id, message) in &outcome.failed {
                warn!("Failed to import object {}: {}", id, message);
            }

            stats.inserted += outcome.inserted;
            stats.failed += outcome.failed.len();

            bar.inc(chunk.len() as u64);
            bar.set_message(format!("Inserted: {} | Failed: {}", stats.inserted, stats.failed));
        }

        bar.finish_with_message("Import complete");

        let metrics = PerformanceMetrics::new("passage import", stats.inserted, timer.finish());
        info!("{}", metrics.format());

        Ok(stats)
    }

    fn progress_bar(&self, total: u64) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let bar = ProgressBar::new(total);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
        {
            bar.set_style(style.progress_chars("█▓▒░"));
        }
        bar
    }
}

/// Parse one passage per line, recomputing hashes. Returns the passages and
/// the number of lines that could not be parsed.
pub fn parse_jsonl(content: &str) -> (Vec<Passage>, usize) {
    let mut passages = Vec::new();
    let mut skipped = 0;

    for (line_no, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<Passage>(line) {
            Ok(mut passage) => {
                passage.rehash();
                if let Some(topic) = passage.topic.clone()
                    && !passage.topic_list.contains(&topic)
                {
                    passage.topic_list.push(topic);
                }
                passages.push(passage);
            }
            Err(e) => {
                warn!("Skipping line {}: {}", line_no + 1, e);
                skipped += 1;
            }
        }
    }

    (passages, skipped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WeaviateConfig;

    const LINES: &str = r#"{"paper_id":"p1","preprocessor_id":"pre","doc_type":"paragraph","cosmos_object_id":"o1","topic":"covid","text_content":"first"}

not json
{"paper_id":"p2","preprocessor_id":"pre","doc_type":"figure","cosmos_object_id":"o2","text_content":"second","hashed_text":"stale"}
"#;

    #[test]
    fn test_parse_jsonl() {
        let (passages, skipped) = parse_jsonl(LINES);

        assert_eq!(passages.len(), 2);
        assert_eq!(skipped, 1);
        assert_eq!(passages[0].topic_list, vec!["covid".to_string()]);
        assert_eq!(passages[1].hashed_text, Passage::compute_hash("second"));
    }

    #[test]
    fn test_to_object() {
        let config = WeaviateConfig {
            url: Some("http://localhost:8080".to_string()),
            ..WeaviateConfig::default()
        };
        let client = WeaviateClient::new(&config).unwrap();
        let importer = BatchImporter::new(&client, "Passage", 10);

        let (passages, _) = parse_jsonl(LINES);
        let object = importer.to_object(&passages[0]);

        assert_eq!(object["class"], "Passage");
        assert_eq!(object["id"], passages[0].object_id().to_string());
        assert_eq!(object["properties"]["text_content"], "first");
        assert_eq!(object["properties"]["topic_list"][0], "covid");
    }

    #[test]
    fn test_success_rate() {
        let stats = ImportStats {
            passages_read: 4,
            inserted: 3,
            failed: 1,
            skipped_lines: 0,
        };
        assert_eq!(stats.success_rate(), 75.0);
        assert_eq!(ImportStats::default().success_rate(), 0.0);
    }
}
