use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub document: String,
    pub tab: String,
    pub filename: String,
    pub sha256: String,
    pub row_count: usize,
    pub max_columns: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotManifest {
    pub manifest_version: u32,
    pub generated_at: String,
    pub snapshot_directory: String,
    pub document_count: usize,
    pub documents: Vec<SnapshotEntry>,
    #[serde(default)]
    pub missing_documents: Vec<String>,
}
