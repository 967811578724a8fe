use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    /// The chat or embeddings API could not be reached or refused the request
    #[error("Request to the model API failed: {0}")]
    Upstream(String),
    #[error("Unable to render the prompt: {0}")]
    Template(#[from] minijinja::Error),
    #[error("Vector store error: {0}")]
    Store(String),
    #[error("Ingestion error: {0}")]
    Ingest(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for ServerError {
    fn from(err: reqwest::Error) -> Self {
        Self::Upstream(err.to_string())
    }
}

impl ServerError {
    /// HTTP status reported to the client for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Io(err) if err.kind() == std::io::ErrorKind::NotFound => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type ServerResult<T> = Result<T, ServerError>;
