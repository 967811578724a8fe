// Based on openai-api-rs <https://github.com/dongri/openai-api-rs>
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EmbeddingRequest {
    pub model: String,
    pub input: Vec<String>,
}

impl EmbeddingRequest {
    pub fn new(model: String, input: Vec<String>) -> Self {
        Self { model, input }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EmbeddingData {
    pub index: usize,
    pub embedding: Vec<f32>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EmbeddingResponse {
    pub model: String,
    pub data: Vec<EmbeddingData>,
}

impl EmbeddingResponse {
    /// Embeddings in the order of the request inputs
    pub fn into_ordered_embeddings(mut self) -> Vec<Vec<f32>> {
        self.data.sort_by_key(|d| d.index);
        self.data.into_iter().map(|d| d.embedding).collect()
    }
}
