// file: src/exporter/json.rs
// description: json export of retrieved documents with a manifest

use crate::error::Result;
use crate::models::{Document, DocumentQuery};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone)]
pub struct JsonExporter {
    output_dir: PathBuf,
}

#[derive(Debug, Serialize)]
struct ExportedResults<'a> {
    query: &'a DocumentQuery,
    documents: &'a [Document],
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExportManifest {
    pub exported_at: String,
    pub total_documents: usize,
    pub files: Vec<String>,
}

impl JsonExporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir)?;
        Ok(Self { output_dir })
    }

    /// Write the query and its results to `results.json` next to a manifest.
    pub fn export_results(
        &self,
        query: &DocumentQuery,
        documents: &[Document],
        pretty: bool,
    ) -> Result<ExportManifest> {
        info!("Exporting {} documents to {:?}", documents.len(), self.output_dir);

        let results = ExportedResults { query, documents };
        let results_path = self.output_dir.join("results.json");
        fs::write(&results_path, Self::to_json(&results, pretty)?)?;

        let manifest = ExportManifest {
            exported_at: Utc::now().to_rfc3339(),
            total_documents: documents.len(),
            files: vec!["results.json".to_string()],
        };
        fs::write(
            self.output_dir.join("manifest.json"),
            Self::to_json(&manifest, pretty)?,
        )?;

        info!("Export complete: {} documents exported", manifest.total_documents);
        Ok(manifest)
    }

    fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(json)
    }
}
