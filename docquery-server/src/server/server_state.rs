// General imports
use parking_lot::RwLock;
use std::{path::PathBuf, sync::Arc};
use tracing::{Level, event};

use super::server_config::ServerConfig;
use crate::{
    chain::retrieval_chain::RetrievalChain,
    error::ServerResult,
    openai::openai_client::{ChatModel, EmbeddingModel, OpenAIChat, OpenAIEmbedder},
    store::vector_store::VectorStore,
};

#[derive(Clone)]
pub struct ServerState {
    /// Chain answering the questions posted to `/`
    pub chain: Arc<RetrievalChain>,
    /// Host page returned for `GET /`
    pub index_html: PathBuf,
}

impl ServerState {
    pub fn new(chain: RetrievalChain, index_html: PathBuf) -> Self {
        Self {
            chain: Arc::new(chain),
            index_html,
        }
    }

    /// Load the vector store and connect the models named in the config
    pub fn from_config(config: &ServerConfig) -> ServerResult<Self> {
        let store = VectorStore::load(&config.store.vectordb_dir, &config.store.collection)?;
        event!(
            Level::INFO,
            "Loaded {} chunks from collection {}",
            store.len(),
            store.collection_name
        );

        let chat: Arc<dyn ChatModel> = Arc::new(OpenAIChat::new(
            config.chat_model,
            config.chat_api_url.clone(),
            config.chat_model.get_api_key()?,
            config.temperature,
        )?);
        let embedder: Arc<dyn EmbeddingModel> = Arc::new(OpenAIEmbedder::new(
            config.embed.embed_model,
            config.embed.embed_api_url.clone(),
            config.embed.embed_model.get_api_key()?,
        )?);
        let chain = RetrievalChain::new(
            chat,
            embedder,
            Arc::new(RwLock::new(store)),
            config.top_k,
        );
        Ok(Self::new(chain, config.assets_dir.join("index.html")))
    }
}
