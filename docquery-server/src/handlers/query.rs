// Server related imports
use axum::{
    extract::{Form, Json, State},
    response::Html,
};

// General imports
use serde::{Deserialize, Serialize};
use tracing::{Level, event};

use crate::{
    chain::retrieval_chain::ChainResponse, error::ServerResult, server::server_state::ServerState,
};

/// Form posted by the front-end
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct QuestionForm {
    pub question: String,
}

/// Answer the question from the retrieved documents
pub async fn ask_question(
    State(state): State<ServerState>,
    Form(form): Form<QuestionForm>,
) -> ServerResult<Json<ChainResponse>> {
    event!(Level::INFO, "Question: {}", form.question);
    let response = state.chain.answer(&form.question).await?;
    Ok(Json(response))
}

/// Host page of the front-end
pub async fn index(State(state): State<ServerState>) -> ServerResult<Html<String>> {
    let html = tokio::fs::read_to_string(&state.index_html).await?;
    Ok(Html(html))
}
