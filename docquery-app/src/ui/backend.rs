// Dioxus imports
use dioxus::prelude::document;

// General imports
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Backend URL
// DM: used when the page origin is unknown, e.g. on desktop.
//  `DOCQUERY_BACKEND_ADDR` is read at compile time and wins over the page origin
//  so that a bundle served by `dx serve` can still post to `docquery-server`.
pub const ADDR_BACKEND: &str = "http://127.0.0.1:4000";

/// Path under which the server exposes the ingested documents
pub const DOCS_PATH_PREFIX: &str = "/data/docs/";

/// Pick the base URL shared by the question endpoint and the document links
///
/// The build-time override comes first, then the origin of the page when it is
/// served over http(s), and finally [`ADDR_BACKEND`].
pub fn resolve_backend(override_addr: Option<&str>, page_origin: Option<&str>) -> String {
    let page_origin = page_origin
        .filter(|origin| origin.starts_with("http://") || origin.starts_with("https://"));
    override_addr
        .filter(|addr| !addr.trim().is_empty())
        .or(page_origin)
        .unwrap_or(ADDR_BACKEND)
        .trim()
        .trim_end_matches('/')
        .to_string()
}

/// Base URL of the backend as seen from the running page
pub async fn backend_base() -> String {
    let page_origin = document::eval("return window.location.origin;")
        .join::<String>()
        .await
        .ok();
    resolve_backend(option_env!("DOCQUERY_BACKEND_ADDR"), page_origin.as_deref())
}

/// Endpoint the questions are posted to
pub fn question_url(base: &str) -> String {
    format!("{base}/")
}

/// Link to an original document served by the backend
pub fn document_url(base: &str, file_name: &str) -> String {
    format!("{base}{DOCS_PATH_PREFIX}{file_name}")
}

/// Metadata attached to a retrieved chunk
///
/// Only the file name is shown; the server also sends
/// `page_number`, `chunk` and `source`, which are ignored here.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct SourceMetadata {
    pub file_name: String,
}

/// A retrieved excerpt backing the answer
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct SourceDocument {
    pub metadata: SourceMetadata,
    pub page_content: String,
}

/// Answer to a question together with its sources in server order
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct ServerResponse {
    pub answer: String,
    pub source_documents: Vec<SourceDocument>,
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum QueryError {
    #[error("Unable to reach the server: {0}")]
    Network(String),
    #[error("The server answered with status {code}: {message}")]
    Status { code: u16, message: String },
    #[error("Unable to read the server response: {0}")]
    Parse(String),
}

/// Error body returned by the server's `JsonError`
#[derive(Deserialize)]
struct ErrorMessage {
    message: String,
}

/// Interpret the status and body of a `POST /` response
pub fn parse_server_response(status: u16, body: &str) -> Result<ServerResponse, QueryError> {
    if !(200..300).contains(&status) {
        let message = serde_json::from_str::<ErrorMessage>(body)
            .map(|err| err.message)
            .unwrap_or_else(|_| body.trim().to_string());
        return Err(QueryError::Status {
            code: status,
            message,
        });
    }
    serde_json::from_str::<ServerResponse>(body).map_err(|err| QueryError::Parse(err.to_string()))
}

/// Post the question as `question=<urlencoded>` to `base` and parse the answer
pub async fn submit_question(base: &str, question: &str) -> Result<ServerResponse, QueryError> {
    let response = reqwest::Client::new()
        .post(question_url(base))
        .form(&[("question", question)])
        .send()
        .await
        .map_err(|err| QueryError::Network(err.to_string()))?;
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .map_err(|err| QueryError::Network(err.to_string()))?;
    parse_server_response(status, &body)
}
