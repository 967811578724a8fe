use lopdf::Document as PdfDocument;
use std::{fmt::Display, fs, path::Path};
use tracing::{Level, event};

use crate::error::{ServerError, ServerResult};

/// Kinds of files that can be ingested
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    Pdf,
    /// Plain text or markdown, read as a single page
    Text,
}

impl SourceKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "pdf" => Some(Self::Pdf),
            "txt" | "md" => Some(Self::Text),
            _ => None,
        }
    }
}

/// Extract the text of every non-blank page, numbered from 1
pub fn extract_pages(path: &Path) -> ServerResult<Vec<(u32, String)>> {
    if !path.is_file() {
        return Err(ServerError::Ingest(format!(
            "File not found: {}",
            path.display()
        )));
    }
    let pages = match SourceKind::from_path(path) {
        Some(SourceKind::Pdf) => extract_pdf_pages(path)?,
        Some(SourceKind::Text) => vec![(1, fs::read_to_string(path)?)],
        None => {
            return Err(ServerError::Ingest(format!(
                "Unsupported file type: {}",
                path.display()
            )));
        }
    };
    Ok(pages
        .into_iter()
        .filter(|(_, text)| !text.trim().is_empty())
        .collect())
}

fn extract_pdf_pages(path: &Path) -> ServerResult<Vec<(u32, String)>> {
    let document = PdfDocument::load(path)
        .map_err(|err| ServerError::Ingest(format!("{}: {err}", path.display())))?;

    let pages = document
        .get_pages()
        .into_keys()
        .map(|page_number| (page_number, document.extract_text(&[page_number])));
    keep_decoded_pages(path, pages)
}

/// Drop the pages whose text could not be decoded
///
/// The file is only an error when it had pages and none of them decoded.
fn keep_decoded_pages<E: Display>(
    path: &Path,
    pages: impl IntoIterator<Item = (u32, Result<String, E>)>,
) -> ServerResult<Vec<(u32, String)>> {
    let mut decoded = Vec::new();
    let mut failed = 0;
    for (page_number, text) in pages {
        match text {
            Ok(text) => decoded.push((page_number, text)),
            Err(err) => {
                failed += 1;
                event!(
                    Level::WARN,
                    "Skipping page {page_number} of {}: {err}",
                    path.display()
                );
            }
        }
    }
    if decoded.is_empty() && failed > 0 {
        return Err(ServerError::Ingest(format!(
            "{}: none of the {failed} pages could be decoded",
            path.display()
        )));
    }
    Ok(decoded)
}
