use serde::{Deserialize, Serialize};

/// Where a chunk came from
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DocumentMetadata {
    /// 1-based page number within the file
    pub page_number: u32,
    /// Index of the chunk within the page
    pub chunk: usize,
    /// `<file_name>-p<page_number>-<chunk>`
    pub source: String,
    pub file_name: String,
}

impl DocumentMetadata {
    pub fn new(file_name: &str, page_number: u32, chunk: usize) -> Self {
        Self {
            page_number,
            chunk,
            source: format!("{file_name}-p{page_number}-{chunk}"),
            file_name: file_name.to_string(),
        }
    }
}

/// A chunk of document text as stored and as returned to the client
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub page_content: String,
    pub metadata: DocumentMetadata,
}

impl Document {
    pub fn new(page_content: String, metadata: DocumentMetadata) -> Self {
        Self {
            page_content,
            metadata,
        }
    }
}
