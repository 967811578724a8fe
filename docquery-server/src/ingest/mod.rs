pub mod clean_text;
pub mod extract_pages;
pub mod text_splitter;

// General imports
use std::path::{Path, PathBuf};
use tracing::{Level, event};
use walkdir::WalkDir;

use crate::{
    error::{ServerError, ServerResult},
    openai::openai_client::EmbeddingModel,
    server::server_config::IngestConfig,
    store::{
        document::{Document, DocumentMetadata},
        vector_store::VectorStore,
    },
};
use clean_text::{DEFAULT_CLEANING_FUNCTIONS, clean_text};
use extract_pages::{SourceKind, extract_pages};
use text_splitter::RecursiveCharacterTextSplitter;

/// A file that could not be ingested
#[derive(Debug)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct IngestionReport {
    pub documents: Vec<Document>,
    pub skipped_files: Vec<SkippedFile>,
}

/// Ingestible files directly inside `folder`, sorted by path
pub fn discover_documents(folder: &Path) -> ServerResult<Vec<PathBuf>> {
    if !folder.is_dir() {
        return Err(ServerError::Ingest(format!(
            "Document directory not found: {}",
            folder.display()
        )));
    }
    let mut files = WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| SourceKind::from_path(path).is_some())
        .collect::<Vec<_>>();
    files.sort_unstable();
    Ok(files)
}

/// Turn the cleaned pages of one file into document chunks
pub fn text_to_docs(
    pages: Vec<(u32, String)>,
    file_name: &str,
    splitter: &RecursiveCharacterTextSplitter,
) -> Vec<Document> {
    pages
        .into_iter()
        .flat_map(|(page_number, text)| {
            splitter
                .split_text(&text)
                .into_iter()
                .enumerate()
                .map(move |(chunk, content)| {
                    Document::new(content, DocumentMetadata::new(file_name, page_number, chunk))
                })
        })
        .collect()
}

/// Extract, clean and split every file in `folder`
///
/// Files that fail are reported and skipped; it is an error only when
/// nothing could be read at all.
pub fn load_documents(
    folder: &Path,
    splitter: &RecursiveCharacterTextSplitter,
) -> ServerResult<IngestionReport> {
    let files = discover_documents(folder)?;
    if files.is_empty() {
        return Err(ServerError::Ingest(format!(
            "No pdf, txt or md files found in {}",
            folder.display()
        )));
    }

    let mut report = IngestionReport::default();
    for path in files {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        event!(Level::INFO, "Starting to process {file_name}");
        match extract_pages(&path) {
            Ok(raw_pages) => {
                let pages = clean_text(raw_pages, &DEFAULT_CLEANING_FUNCTIONS);
                let documents = text_to_docs(pages, &file_name, splitter);
                event!(
                    Level::INFO,
                    "{file_name} ready to be added to the vector store ({} chunks)",
                    documents.len()
                );
                report.documents.extend(documents);
            }
            Err(err) => {
                event!(Level::WARN, "Skipping {}: {err}", path.display());
                report.skipped_files.push(SkippedFile {
                    path,
                    reason: err.to_string(),
                });
            }
        }
    }

    if report.documents.is_empty() {
        return Err(ServerError::Ingest(format!(
            "No text could be extracted from {} ({} files skipped)",
            folder.display(),
            report.skipped_files.len()
        )));
    }
    Ok(report)
}

/// Build the vector store for `config.document_dir` and persist it
pub async fn ingest(
    config: &IngestConfig,
    embedder: &dyn EmbeddingModel,
) -> ServerResult<VectorStore> {
    let splitter = RecursiveCharacterTextSplitter::new(config.chunk_size, config.chunk_overlap)?;
    let report = load_documents(&config.document_dir, &splitter)?;

    let mut store = VectorStore::new(&config.store.collection);
    for batch in report.documents.chunks(config.batch_size.max(1)) {
        let inputs = batch
            .iter()
            .map(|document| document.page_content.clone())
            .collect::<Vec<_>>();
        let embeddings = embedder.embed(inputs).await?;
        store.add(batch.to_vec(), embeddings)?;
        event!(
            Level::DEBUG,
            "Embedded {}/{} chunks",
            store.len(),
            report.documents.len()
        );
    }
    store.persist(&config.store.vectordb_dir)?;

    event!(
        Level::INFO,
        "Finished creating the vector store: {} chunks, {} files skipped",
        store.len(),
        report.skipped_files.len()
    );
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        openai::{openai_which::WhichOpenAIAsset, test_models::LetterEmbedder},
        server::server_config::{EmbedArgs, StoreArgs},
    };
    use anyhow::Result;
    use std::fs;

    fn make_config(document_dir: &Path, vectordb_dir: &Path) -> IngestConfig {
        IngestConfig {
            document_dir: document_dir.to_path_buf(),
            store: StoreArgs {
                vectordb_dir: vectordb_dir.to_path_buf(),
                collection: "chromadb".to_string(),
            },
            embed: EmbedArgs {
                embed_model: WhichOpenAIAsset::TextEmbeddingAda002,
                embed_api_url: None,
            },
            chunk_size: 100,
            chunk_overlap: 20,
            batch_size: 2,
        }
    }

    #[test]
    fn test_discover_documents() -> Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("b.txt"), "b")?;
        fs::write(dir.path().join("a.PDF"), "a")?;
        fs::write(dir.path().join("c.png"), "c")?;
        fs::create_dir(dir.path().join("nested"))?;
        fs::write(dir.path().join("nested").join("d.txt"), "d")?;

        let names = discover_documents(dir.path())?
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["a.PDF", "b.txt"]);

        assert!(discover_documents(&dir.path().join("missing")).is_err());
        Ok(())
    }

    #[test]
    fn test_text_to_docs() {
        let splitter = RecursiveCharacterTextSplitter::new(10, 0).unwrap();
        let documents = text_to_docs(
            vec![(2, "aaaa bbbb cccc".to_string()), (5, "dd".to_string())],
            "guide.pdf",
            &splitter,
        );
        let summary = documents
            .iter()
            .map(|d| (d.page_content.as_str(), d.metadata.source.as_str()))
            .collect::<Vec<_>>();
        assert_eq!(
            summary,
            vec![
                ("aaaa bbbb", "guide.pdf-p2-0"),
                ("cccc", "guide.pdf-p2-1"),
                ("dd", "guide.pdf-p5-0"),
            ]
        );
        assert_eq!(documents[1].metadata.page_number, 2);
        assert_eq!(documents[1].metadata.chunk, 1);
        assert_eq!(documents[1].metadata.file_name, "guide.pdf");
    }

    #[test]
    fn test_load_documents_skips_broken_files() -> Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(
            dir.path().join("manual.txt"),
            "The compres-\nsor runs\non 24 volts.\n\n\nIt needs no oil.",
        )?;
        fs::write(dir.path().join("broken.pdf"), "not a pdf")?;

        let splitter = RecursiveCharacterTextSplitter::default();
        let report = load_documents(dir.path(), &splitter)?;
        assert_eq!(report.skipped_files.len(), 1);
        assert!(report.skipped_files[0].path.ends_with("broken.pdf"));
        assert_eq!(report.documents.len(), 1);
        assert_eq!(
            report.documents[0].page_content,
            "The compressor runs on 24 volts.\nIt needs no oil."
        );

        // Nothing readable is an error
        let empty = tempfile::tempdir()?;
        assert!(load_documents(empty.path(), &splitter).is_err());
        fs::write(empty.path().join("broken.pdf"), "not a pdf")?;
        assert!(load_documents(empty.path(), &splitter).is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_ingest() -> Result<()> {
        let docs = tempfile::tempdir()?;
        let vectordb = tempfile::tempdir()?;
        let paragraph = "Valves are closed before maintenance. Filters are changed monthly. ";
        fs::write(docs.path().join("maintenance.txt"), paragraph.repeat(5))?;
        fs::write(docs.path().join("safety.md"), "Wear gloves near the boiler.")?;

        let config = make_config(docs.path(), vectordb.path());
        let store = ingest(&config, &LetterEmbedder).await?;
        assert!(store.len() > 2);
        assert!(
            store
                .chunks
                .iter()
                .all(|c| c.document.page_content.chars().count() <= 100 && c.embedding.len() == 26)
        );

        // The persisted collection is what the server loads
        let loaded = VectorStore::load(vectordb.path(), "chromadb")?;
        assert_eq!(loaded, store);
        assert_eq!(
            loaded.chunks.last().unwrap().document.metadata.file_name,
            "safety.md"
        );
        Ok(())
    }
}
