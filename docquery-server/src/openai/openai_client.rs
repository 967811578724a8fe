use async_trait::async_trait;
use reqwest::{Client, header::CONTENT_TYPE};
use serde::de::DeserializeOwned;
use tracing::{Level, event};

use super::{
    chat_completion::{
        ChatCompletionMessage, ChatCompletionRequest, ChatCompletionResponse, FinishReason,
    },
    embedding::{EmbeddingRequest, EmbeddingResponse},
    openai_which::WhichOpenAIAsset,
};
use crate::error::{ServerError, ServerResult};

/// Model that turns a conversation into a single reply
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, messages: Vec<ChatCompletionMessage>) -> ServerResult<String>;
}

/// Model that maps texts to embedding vectors, one per input and in input order
#[async_trait]
pub trait EmbeddingModel: Send + Sync {
    async fn embed(&self, inputs: Vec<String>) -> ServerResult<Vec<Vec<f32>>>;
}

/// Connection details shared by the chat and embeddings clients
#[derive(Clone, Debug)]
struct OpenAIConnection {
    client: Client,
    asset: WhichOpenAIAsset,
    api_url: String,
    api_key: String,
}

impl OpenAIConnection {
    fn new(asset: WhichOpenAIAsset, api_url: Option<String>, api_key: String) -> Self {
        Self {
            client: Client::new(),
            asset,
            api_url: asset.get_api_url(api_url),
            api_key,
        }
    }

    /// Post a JSON request and parse the JSON response
    async fn post<Req, Resp>(&self, request: &Req) -> ServerResult<Resp>
    where
        Req: serde::Serialize + ?Sized + Sync,
        Resp: DeserializeOwned,
    {
        let response = self
            .client
            .post(self.api_url.as_str())
            .bearer_auth(self.api_key.as_str())
            .header(CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ServerError::Upstream(format!(
                "{} answered {status}: {}",
                self.api_url,
                text.trim()
            )));
        }

        // `serde_path_to_error` points at the offending field when the schema does not match
        let deserializer = &mut serde_json::Deserializer::from_str(&text);
        serde_path_to_error::deserialize(deserializer).map_err(|err| {
            ServerError::Upstream(format!(
                "Unexpected response from {} at `{}`: {}",
                self.api_url,
                err.path(),
                err.inner()
            ))
        })
    }
}

/// Chat completions over an OpenAI compatible API
#[derive(Clone, Debug)]
pub struct OpenAIChat {
    connection: OpenAIConnection,
    temperature: f64,
}

impl OpenAIChat {
    pub fn new(
        asset: WhichOpenAIAsset,
        api_url: Option<String>,
        api_key: String,
        temperature: f64,
    ) -> ServerResult<Self> {
        if !asset.is_chat() {
            return Err(ServerError::Config(format!(
                "{} is not a chat model",
                asset.get_name()
            )));
        }
        Ok(Self {
            connection: OpenAIConnection::new(asset, api_url, api_key),
            temperature,
        })
    }
}

#[async_trait]
impl ChatModel for OpenAIChat {
    async fn complete(&self, messages: Vec<ChatCompletionMessage>) -> ServerResult<String> {
        let request = ChatCompletionRequest::new(
            self.connection.asset.get_name().to_string(),
            messages,
        )
        .temperature(self.temperature);
        let response: ChatCompletionResponse = self.connection.post(&request).await?;

        let Some(choice) = response.choices.into_iter().next() else {
            return Err(ServerError::Upstream(format!(
                "{} returned no choices",
                response.model
            )));
        };
        if choice.finish_reason == Some(FinishReason::length) {
            event!(Level::WARN, "Answer from {} was truncated", response.model);
        }
        Ok(choice.message.content.unwrap_or_default())
    }
}

/// Embeddings over an OpenAI compatible API
#[derive(Clone, Debug)]
pub struct OpenAIEmbedder {
    connection: OpenAIConnection,
}

impl OpenAIEmbedder {
    pub fn new(
        asset: WhichOpenAIAsset,
        api_url: Option<String>,
        api_key: String,
    ) -> ServerResult<Self> {
        if asset.is_chat() {
            return Err(ServerError::Config(format!(
                "{} is not an embedding model",
                asset.get_name()
            )));
        }
        Ok(Self {
            connection: OpenAIConnection::new(asset, api_url, api_key),
        })
    }
}

#[async_trait]
impl EmbeddingModel for OpenAIEmbedder {
    async fn embed(&self, inputs: Vec<String>) -> ServerResult<Vec<Vec<f32>>> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }
        let num_inputs = inputs.len();
        let request = EmbeddingRequest::new(self.connection.asset.get_name().to_string(), inputs);
        let response: EmbeddingResponse = self.connection.post(&request).await?;
        let embeddings = response.into_ordered_embeddings();
        if embeddings.len() != num_inputs {
            return Err(ServerError::Upstream(format!(
                "Expected {num_inputs} embeddings but received {}",
                embeddings.len()
            )));
        }
        Ok(embeddings)
    }
}
