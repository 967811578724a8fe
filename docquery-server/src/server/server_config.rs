// General imports
use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::{
    chain::retrieval_chain::DEFAULT_TOP_K,
    ingest::text_splitter::{DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE},
    openai::openai_which::WhichOpenAIAsset,
    store::vector_store::DEFAULT_COLLECTION,
};

/// Output directory of `dx bundle` for the front-end, kept apart from `.env` and the data
pub const DEFAULT_ASSETS_DIR: &str = "docquery-app/dist";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Answer questions, serve the documents and the front-end
    Serve(ServerConfig),
    /// Build the vector store from a directory of documents
    Ingest(IngestConfig),
}

/// Location of the persisted vector store
#[derive(Args, Debug, Clone, Serialize, Deserialize)]
pub struct StoreArgs {
    /// Directory holding the vector store collections
    #[arg(long, env = "VECTORDB_DIR", default_value = "data/vectordb")]
    pub vectordb_dir: PathBuf,

    /// Name of the collection
    #[arg(long, default_value = DEFAULT_COLLECTION)]
    pub collection: String,
}

/// Embedding model used for both documents and questions
#[derive(Args, Debug, Clone, Serialize, Deserialize)]
pub struct EmbedArgs {
    #[arg(long, value_enum, default_value = "text-embedding-ada-002")]
    pub embed_model: WhichOpenAIAsset,

    /// Base URL of an OpenAI compatible embeddings API
    #[arg(long, env = "EMBED_API_URL")]
    pub embed_api_url: Option<String>,
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to serve the application on
    #[arg(long, default_value = "127.0.0.1:4000")]
    pub address: String,

    /// Assets directory with the built front-end and its `index.html`
    #[arg(long, env = "ASSETS_DIR", default_value = DEFAULT_ASSETS_DIR)]
    pub assets_dir: PathBuf,

    /// Directory of the ingested documents, served under `/data/docs`
    #[arg(long, env = "DOCUMENT_DIR", default_value = "data/docs")]
    pub document_dir: PathBuf,

    #[command(flatten)]
    pub store: StoreArgs,

    #[command(flatten)]
    pub embed: EmbedArgs,

    #[arg(long, value_enum, default_value = "gpt-3.5-turbo")]
    pub chat_model: WhichOpenAIAsset,

    /// Base URL of an OpenAI compatible chat completions API
    #[arg(long, env = "CHAT_API_URL")]
    pub chat_api_url: Option<String>,

    /// Sampling temperature of the chat model
    #[arg(long, default_value_t = 1.0)]
    pub temperature: f64,

    /// Number of source documents retrieved per question
    #[arg(long, default_value_t = DEFAULT_TOP_K)]
    pub top_k: usize,
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Directory of pdf, txt and md files to ingest
    #[arg(long, env = "DOCUMENT_DIR", default_value = "data/docs")]
    pub document_dir: PathBuf,

    #[command(flatten)]
    pub store: StoreArgs,

    #[command(flatten)]
    pub embed: EmbedArgs,

    /// Maximum number of characters per chunk
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,

    /// Number of characters shared by consecutive chunks
    #[arg(long, default_value_t = DEFAULT_CHUNK_OVERLAP)]
    pub chunk_overlap: usize,

    /// Number of chunks sent per embeddings request
    #[arg(long, default_value_t = 64)]
    pub batch_size: usize,
}
