// Dioxus imports
use dioxus::logger::tracing;
use dioxus::prelude::*;

// General imports
use futures::StreamExt;
use serde::{Deserialize, Serialize};

use super::backend::{
    backend_base, document_url, submit_question, QueryError, ServerResponse, SourceDocument,
};

/// Number of characters of `page_content` shown on a source card
pub const EXCERPT_CHARS: usize = 240;

/// Cut the page content down to a card excerpt
///
/// Content shorter than [`EXCERPT_CHARS`] is kept whole and still gets
/// the trailing ellipsis.
pub fn make_excerpt(page_content: &str) -> String {
    let head: String = page_content.chars().take(EXCERPT_CHARS).collect();
    format!("...{head}...")
}

/// One rendered source document
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct SourceCard {
    /// 1-based display index
    pub index: usize,
    pub file_name: String,
    pub file_path: String,
    pub excerpt: String,
}

impl SourceCard {
    /// Card for the document at `position`, linking to the file on `backend`
    pub fn new(position: usize, document: &SourceDocument, backend: &str) -> Self {
        Self {
            index: position + 1,
            file_name: document.metadata.file_name.clone(),
            file_path: document_url(backend, &document.metadata.file_name),
            excerpt: make_excerpt(&document.page_content),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum QueryStatus {
    #[default]
    Idle,
    Pending,
    Answered,
    Failed(String),
}

impl QueryStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Idle => "idle",
            Self::Pending => "pending",
            Self::Answered => "answered",
            Self::Failed(_) => "failed",
        }
    }

    /// Text shown in the status line
    pub fn message(&self) -> String {
        match self {
            Self::Idle => "Ask a question about the document collection.".to_string(),
            Self::Pending => "Searching the documents...".to_string(),
            Self::Answered => String::new(),
            Self::Failed(reason) => reason.to_owned(),
        }
    }
}

/// Identifies one submission so that a superseded response can be dropped
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SubmitTicket(u64);

/// Everything the query page displays
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryView {
    /// Current value of the question input
    pub question: String,
    pub answer: String,
    pub cards: Vec<SourceCard>,
    pub status: QueryStatus,
    /// Base URL questions are posted to, also used for the document links
    pub backend: String,
    current: Option<SubmitTicket>,
    issued: u64,
}

impl QueryView {
    /// Start a submission
    ///
    /// Clears the input field and supersedes any submission still in flight.
    ///
    /// # Returns
    ///
    /// (SubmitTicket, String) of the new ticket and the question to send
    pub fn begin_submit(&mut self) -> (SubmitTicket, String) {
        let question = std::mem::take(&mut self.question);
        self.issued += 1;
        let ticket = SubmitTicket(self.issued);
        self.current = Some(ticket);
        self.status = QueryStatus::Pending;
        (ticket, question)
    }

    /// Whether `ticket` belongs to the latest submission still awaiting its outcome
    pub fn is_current(&self, ticket: SubmitTicket) -> bool {
        self.current == Some(ticket)
    }

    /// Replace the answer and the source cards with the server response
    pub fn render(&mut self, response: ServerResponse) {
        self.cards = response
            .source_documents
            .iter()
            .enumerate()
            .map(|(position, document)| SourceCard::new(position, document, &self.backend))
            .collect();
        self.answer = response.answer;
        self.status = QueryStatus::Answered;
    }

    /// Apply the outcome of a submission
    ///
    /// Failures only touch the status line so that the previous
    /// answer stays readable.
    ///
    /// # Returns
    ///
    /// false when the ticket was superseded and the outcome was dropped
    pub fn apply(
        &mut self,
        ticket: SubmitTicket,
        outcome: Result<ServerResponse, QueryError>,
    ) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.current = None;
        match outcome {
            Ok(response) => self.render(response),
            Err(err) => self.status = QueryStatus::Failed(err.to_string()),
        }
        true
    }
}

// Query page state
pub static QUERY_VIEW: GlobalSignal<QueryView> = Signal::global(QueryView::default);

#[derive(Clone, Debug)]
pub struct SubmitQueryState {
    pub ticket: SubmitTicket,
    pub question: String,
}

/// Post each submitted question and apply its outcome
///
/// Runs for the lifetime of the main window so that a request keeps going
/// while another page is shown. A new submission cancels the one in flight.
pub async fn submit_query_state(mut rx: UnboundedReceiver<SubmitQueryState>) {
    let backend = backend_base().await;
    tracing::debug!("Posting questions to {backend}");
    QUERY_VIEW.write().backend = backend.clone();

    let mut in_flight: Option<Task> = None;
    while let Some(submission) = rx.next().await {
        if let Some(task) = in_flight.take() {
            task.cancel();
        }
        let backend = backend.clone();
        in_flight = Some(spawn(async move {
            let SubmitQueryState { ticket, question } = submission;
            let outcome = submit_question(&backend, &question).await;
            if let Err(err) = &outcome {
                tracing::warn!("Query {ticket:?} failed: {err}");
            }
            if !QUERY_VIEW.write().apply(ticket, outcome) {
                tracing::debug!("Dropping the outcome of superseded query {ticket:?}");
            }
        }));
    }
}
