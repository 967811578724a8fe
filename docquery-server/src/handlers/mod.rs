pub mod hidden_paths;
pub mod json_error;
pub mod query;

// DM: All of the routes are exercised against a single app per test
// see testing with axum <https://github.com/tokio-rs/axum/blob/main/examples/testing/src/main.rs>
#[cfg(test)]
mod tests {
    use crate::{
        chain::retrieval_chain::{ChainResponse, RetrievalChain},
        openai::{
            openai_client::ChatModel,
            test_models::{FailingChat, LetterEmbedder, MockChat},
        },
        server::{server_app::AppBuilder, server_state::ServerState},
        store::{
            document::{Document, DocumentMetadata},
            vector_store::VectorStore,
        },
    };

    use anyhow::Result;
    use parking_lot::RwLock;
    use reqwest::StatusCode;
    use serde_json::Value;
    use std::{path::Path, sync::Arc};

    fn make_state(chat: Arc<dyn ChatModel>, assets_dir: &Path) -> ServerState {
        let mut store = VectorStore::new("chromadb");
        let texts = [
            ("pumps.pdf", "Pumps are primed before start."),
            ("filters.pdf", "Filters are changed monthly."),
        ];
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

        let chain = RetrievalChain::new(
            chat,
            Arc::new(LetterEmbedder),
            Arc::new(RwLock::new(store)),
            1,
        );
        ServerState::new(chain, assets_dir.join("index.html"))
    }

    /// Serve the app on a free port and return its base url
    async fn spawn_app(state: ServerState, docs_dir: &Path, assets_dir: &Path) -> Result<String> {
        let app = AppBuilder::new(state)
            .with_documents(docs_dir)
            .with_fallback(assets_dir)
            .with_hidden_paths_rejected()
            .with_cors_layer()
            .build();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Ok(format!("http://{addr}"))
    }

    #[tokio::test]
    async fn test_ask_question() -> Result<()> {
        let assets = tempfile::tempdir()?;
        let docs = tempfile::tempdir()?;
        let chat = Arc::new(MockChat::new("Once a month."));
        let url = spawn_app(make_state(chat.clone(), assets.path()), docs.path(), assets.path()).await?;

        let response = reqwest::Client::new()
            .post(format!("{url}/"))
            .form(&[("question", "How often are filters changed?")])
            .send()
            .await?;
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.json::<ChainResponse>().await?;
        assert_eq!(body.answer, "Once a month.");
        assert_eq!(body.source_documents.len(), 1);
        assert_eq!(body.source_documents[0].metadata.file_name, "filters.pdf");
        assert_eq!(
            body.source_documents[0].page_content,
            "Filters are changed monthly."
        );
        assert!(chat.prompts.lock()[0].contains("How often are filters changed?"));
        Ok(())
    }

    #[tokio::test]
    async fn test_ask_question_without_field() -> Result<()> {
        let assets = tempfile::tempdir()?;
        let docs = tempfile::tempdir()?;
        let state = make_state(Arc::new(MockChat::new("unused")), assets.path());
        let url = spawn_app(state, docs.path(), assets.path()).await?;

        let response = reqwest::Client::new()
            .post(format!("{url}/"))
            .form(&[("query", "filters")])
            .send()
            .await?;
        assert!(response.status().is_client_error());
        Ok(())
    }

    #[tokio::test]
    async fn test_ask_question_upstream_failure() -> Result<()> {
        let assets = tempfile::tempdir()?;
        let docs = tempfile::tempdir()?;
        let url = spawn_app(make_state(Arc::new(FailingChat), assets.path()), docs.path(), assets.path()).await?;

        let response = reqwest::Client::new()
            .post(format!("{url}/"))
            .form(&[("question", "filters")])
            .send()
            .await?;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = response.json::<Value>().await?;
        assert!(body["message"].as_str().unwrap().contains("connection refused"));
        Ok(())
    }

    #[tokio::test]
    async fn test_static_routes() -> Result<()> {
        let assets = tempfile::tempdir()?;
        let docs = tempfile::tempdir()?;
        std::fs::write(assets.path().join("index.html"), "<div id=\"main\"></div>")?;
        std::fs::write(assets.path().join("main.css"), "body {}")?;
        std::fs::write(docs.path().join("manual.txt"), "Filters are changed monthly.")?;
        let state = make_state(Arc::new(MockChat::new("unused")), assets.path());
        let url = spawn_app(state, docs.path(), assets.path()).await?;

        let index = reqwest::get(format!("{url}/")).await?;
        assert_eq!(index.status(), StatusCode::OK);
        assert_eq!(index.text().await?, "<div id=\"main\"></div>");

        let css = reqwest::get(format!("{url}/main.css")).await?;
        assert_eq!(css.status(), StatusCode::OK);
        assert_eq!(css.text().await?, "body {}");

        let doc = reqwest::get(format!("{url}/data/docs/manual.txt")).await?;
        assert_eq!(doc.status(), StatusCode::OK);
        assert_eq!(doc.text().await?, "Filters are changed monthly.");

        let missing = reqwest::get(format!("{url}/data/docs/missing.pdf")).await?;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
        Ok(())
    }

    #[tokio::test]
    async fn test_hidden_files_are_not_served() -> Result<()> {
        let assets = tempfile::tempdir()?;
        let docs = tempfile::tempdir()?;
        std::fs::write(assets.path().join(".env"), "OPENAI_API_KEY=sk-secret")?;
        std::fs::create_dir(assets.path().join(".git"))?;
        std::fs::write(assets.path().join(".git").join("config"), "[core]")?;
        std::fs::write(docs.path().join(".notes.txt"), "private")?;
        let state = make_state(Arc::new(MockChat::new("unused")), assets.path());
        let url = spawn_app(state, docs.path(), assets.path()).await?;

        for path in ["/.env", "/%2Eenv", "/.git/config", "/data/docs/.notes.txt"] {
            let response = reqwest::get(format!("{url}{path}")).await?;
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{path}");
            assert!(!response.text().await?.contains("sk-secret"));
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_index_without_assets() -> Result<()> {
        let assets = tempfile::tempdir()?;
        let docs = tempfile::tempdir()?;
        let state = make_state(Arc::new(MockChat::new("unused")), assets.path());
        let url = spawn_app(state, docs.path(), assets.path()).await?;

        let index = reqwest::get(format!("{url}/")).await?;
        assert_eq!(index.status(), StatusCode::NOT_FOUND);
        Ok(())
    }
}
