// Server related imports
use axum::{
    Router,
    http::{self, Method},
    middleware,
    routing::{get, get_service},
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

// General imports
use anyhow::{Context, Result};
use parking_lot::RwLock;
use std::{path::Path, sync::Arc};
use tokio::net::TcpListener;

// From lib
use super::{server_config::ServerConfig, server_state::ServerState};
use crate::handlers::{
    hidden_paths::reject_hidden_paths,
    query::{ask_question, index},
};

/// Prefix under which the ingested documents are served
pub const DOCS_ROUTE: &str = "/data/docs";

pub struct AppBuilder {
    pub app: Router,
}

impl AppBuilder {
    pub fn new(state: ServerState) -> Self {
        // Router
        let app: Router = Router::new()
            .route("/", get(index).post(ask_question))
            .with_state(state);
        Self { app }
    }

    /// Serve the original documents so that source links resolve
    pub fn with_documents(self, dir: &Path) -> Self {
        Self {
            app: self.app.nest_service(DOCS_ROUTE, ServeDir::new(dir)),
        }
    }

    pub fn with_fallback(self, dir: &Path) -> Self {
        Self {
            app: self.app.fallback(get_service(ServeDir::new(dir))),
        }
    }

    /// Dotfiles under the static directories are answered with 404
    pub fn with_hidden_paths_rejected(self) -> Self {
        Self {
            app: self.app.layer(middleware::from_fn(reject_hidden_paths)),
        }
    }

    pub fn with_trace_layer(self) -> Self {
        Self {
            app: self.app.layer(TraceLayer::new_for_http()),
        }
    }

    pub fn with_cors_layer(self) -> Self {
        // CORS
        let cors_layer = if cfg!(debug_assertions) {
            CorsLayer::permissive()
        } else {
            let allow_origin = AllowOrigin::any();
            CorsLayer::new()
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([http::header::CONTENT_TYPE])
                .allow_origin(allow_origin)
        };
        Self {
            app: self.app.layer(cors_layer),
        }
    }

    pub fn build(self) -> Router {
        self.app
    }
}

pub struct Server {
    /// Server configuration
    config: Arc<RwLock<ServerConfig>>,
}

impl Server {
    /// Create a new server from a configuration
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
        }
    }

    /// Run the server
    pub async fn run(&self) -> Result<()> {
        let config = self.config.read().clone();
        let state = ServerState::from_config(&config)?;
        let app: Router = AppBuilder::new(state)
            .with_documents(&config.document_dir)
            .with_fallback(&config.assets_dir)
            .with_hidden_paths_rejected()
            .with_trace_layer()
            .with_cors_layer()
            .build();

        Self::serve(app, &config.address).await
    }

    async fn serve(app: Router, addr: &str) -> Result<()> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Unable to bind {addr}"))?;
        tracing::info!("listening on {}", addr);
        axum::serve(listener, app).await?;
        Ok(())
    }
}
