// General imports
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{Level, event};

use super::prompt::render_stuff_prompt;
use crate::{
    error::{ServerError, ServerResult},
    openai::{
        chat_completion::ChatCompletionMessage,
        openai_client::{ChatModel, EmbeddingModel},
    },
    store::{document::Document, vector_store::VectorStore},
};

/// Number of chunks retrieved per question when none is configured
pub const DEFAULT_TOP_K: usize = 4;

/// Answer with the chunks it was written from, in retrieval order
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ChainResponse {
    pub answer: String,
    pub source_documents: Vec<Document>,
}

/// Retrieve the closest chunks and let the chat model answer from them
pub struct RetrievalChain {
    chat: Arc<dyn ChatModel>,
    embedder: Arc<dyn EmbeddingModel>,
    store: Arc<RwLock<VectorStore>>,
    top_k: usize,
}

impl RetrievalChain {
    pub fn new(
        chat: Arc<dyn ChatModel>,
        embedder: Arc<dyn EmbeddingModel>,
        store: Arc<RwLock<VectorStore>>,
        top_k: usize,
    ) -> Self {
        Self {
            chat,
            embedder,
            store,
            top_k,
        }
    }

    /// The `top_k` chunks closest to the question
    pub async fn retrieve(&self, question: &str) -> ServerResult<Vec<Document>> {
        let embedding = self
            .embedder
            .embed(vec![question.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ServerError::Upstream("No embedding returned for the question".to_string()))?;
        let documents = self
            .store
            .read()
            .similarity_search(&embedding, self.top_k)
            .into_iter()
            .map(|(document, score)| {
                event!(
                    Level::DEBUG,
                    "Retrieved {} with score {score:.4}",
                    document.metadata.source
                );
                document
            })
            .collect::<Vec<_>>();
        Ok(documents)
    }

    pub async fn answer(&self, question: &str) -> ServerResult<ChainResponse> {
        let source_documents = self.retrieve(question).await?;
        let prompt = render_stuff_prompt(&source_documents, question)?;
        let answer = self
            .chat
            .complete(vec![ChatCompletionMessage::user(prompt)])
            .await?;
        event!(
            Level::INFO,
            "Answered from {} source documents",
            source_documents.len()
        );
        Ok(ChainResponse {
            answer,
            source_documents,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        openai::test_models::{FailingChat, LetterEmbedder, MockChat},
        store::document::DocumentMetadata,
    };
    use anyhow::Result;

    fn make_store(texts: &[(&str, &str)]) -> Arc<RwLock<VectorStore>> {
        let mut store = VectorStore::new("chromadb");
        let documents = texts
            .iter()
            .map(|(file_name, text)| {
                Document::new(text.to_string(), DocumentMetadata::new(file_name, 1, 0))
            })
            .collect::<Vec<_>>();
        let embeddings = texts
            .iter()
            .map(|(_, text)| LetterEmbedder::embed_one(text))
            .collect::<Vec<_>>();
        store.add(documents, embeddings).unwrap();
        Arc::new(RwLock::new(store))
    }

    #[tokio::test]
    async fn test_answer() -> Result<()> {
        let chat = Arc::new(MockChat::new("Every month."));
        let store = make_store(&[
            ("pumps.pdf", "zzz zzz"),
            ("filters.pdf", "filters are changed monthly"),
            ("boilers.pdf", "xxyy"),
        ]);
        let chain = RetrievalChain::new(chat.clone(), Arc::new(LetterEmbedder), store, 2);

        let response = chain.answer("when are filters changed").await?;
        assert_eq!(response.answer, "Every month.");
        assert_eq!(response.source_documents.len(), 2);
        assert_eq!(response.source_documents[0].metadata.file_name, "filters.pdf");

        // The prompt carries the retrieved context and the question
        let prompts = chat.prompts.lock();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("filters are changed monthly"));
        assert!(prompts[0].contains("Question: when are filters changed"));
        Ok(())
    }

    #[tokio::test]
    async fn test_answer_with_empty_store() -> Result<()> {
        let chain = RetrievalChain::new(
            Arc::new(MockChat::new("I don't know.")),
            Arc::new(LetterEmbedder),
            Arc::new(RwLock::new(VectorStore::new("chromadb"))),
            DEFAULT_TOP_K,
        );
        let response = chain.answer("").await?;
        assert_eq!(response.answer, "I don't know.");
        assert!(response.source_documents.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_answer_upstream_failure() {
        let chain = RetrievalChain::new(
            Arc::new(FailingChat),
            Arc::new(LetterEmbedder),
            make_store(&[("a.pdf", "abc")]),
            DEFAULT_TOP_K,
        );
        let err = chain.answer("abc").await.unwrap_err();
        assert!(matches!(err, ServerError::Upstream(_)));
    }
}
