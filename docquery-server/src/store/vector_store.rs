use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use super::document::Document;
use crate::error::{ServerError, ServerResult};

/// Collection name used when none is configured
pub const DEFAULT_COLLECTION: &str = "chromadb";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct StoredChunk {
    pub document: Document,
    pub embedding: Vec<f32>,
}

/// Embedded document chunks persisted as a single JSON file per collection
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct VectorStore {
    pub collection_name: String,
    pub chunks: Vec<StoredChunk>,
}

/// Cosine similarity of two vectors
///
/// Returns `None` when the dimensions differ; a zero vector scores 0.
pub fn cosine_similarity(lhs: &[f32], rhs: &[f32]) -> Option<f32> {
    if lhs.len() != rhs.len() {
        return None;
    }
    let dot: f32 = lhs.iter().zip(rhs).map(|(l, r)| l * r).sum();
    let lhs_norm = lhs.iter().map(|l| l * l).sum::<f32>().sqrt();
    let rhs_norm = rhs.iter().map(|r| r * r).sum::<f32>().sqrt();
    if lhs_norm == 0.0 || rhs_norm == 0.0 {
        return Some(0.0);
    }
    Some(dot / (lhs_norm * rhs_norm))
}

impl VectorStore {
    pub fn new(collection_name: &str) -> Self {
        Self {
            collection_name: collection_name.to_string(),
            chunks: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Add documents with their embeddings, pairing them by position
    pub fn add(&mut self, documents: Vec<Document>, embeddings: Vec<Vec<f32>>) -> ServerResult<()> {
        if documents.len() != embeddings.len() {
            return Err(ServerError::Store(format!(
                "{} documents were given {} embeddings",
                documents.len(),
                embeddings.len()
            )));
        }
        self.chunks.extend(
            documents
                .into_iter()
                .zip(embeddings)
                .map(|(document, embedding)| StoredChunk {
                    document,
                    embedding,
                }),
        );
        Ok(())
    }

    /// The `k` chunks most similar to `query`, best first
    ///
    /// Equal scores keep insertion order and chunks embedded with a
    /// different dimension are skipped.
    pub fn similarity_search(&self, query: &[f32], k: usize) -> Vec<(Document, f32)> {
        let mut scored = self
            .chunks
            .iter()
            .filter_map(|chunk| {
                cosine_similarity(query, &chunk.embedding).map(|score| (chunk, score))
            })
            .collect::<Vec<_>>();
        scored.sort_by(|(_, lhs), (_, rhs)| rhs.total_cmp(lhs));
        scored
            .into_iter()
            .take(k)
            .map(|(chunk, score)| (chunk.document.clone(), score))
            .collect()
    }

    /// Location of a collection inside the vector store directory
    pub fn collection_path(dir: &Path, collection_name: &str) -> PathBuf {
        dir.join(format!("{collection_name}.json"))
    }

    /// Write the collection to `dir`, replacing any previous version
    pub fn persist(&self, dir: &Path) -> ServerResult<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = Self::collection_path(dir, &self.collection_name);
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, serde_json::to_vec(self)?)?;
        fs::rename(&tmp_path, &path)?;
        tracing::info!(
            "Persisted {} chunks of collection {} to {}",
            self.len(),
            self.collection_name,
            path.display()
        );
        Ok(path)
    }

    /// Read a collection previously written by [`VectorStore::persist`]
    pub fn load(dir: &Path, collection_name: &str) -> ServerResult<Self> {
        let path = Self::collection_path(dir, collection_name);
        let bytes = fs::read(&path).map_err(|err| {
            ServerError::Store(format!(
                "Unable to read {}: {err}. Run `docquery-server ingest` first.",
                path.display()
            ))
        })?;
        let store: Self = serde_json::from_slice(&bytes)?;
        if store.collection_name != collection_name {
            return Err(ServerError::Store(format!(
                "{} holds collection {} instead of {collection_name}",
                path.display(),
                store.collection_name
            )));
        }
        Ok(store)
    }
}
