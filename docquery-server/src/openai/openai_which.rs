use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{Level, event};

/// General dependencies
use std::env;

use crate::error::{ServerError, ServerResult};

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
pub enum WhichOpenAIAsset {
    #[value(name = "gpt-3.5-turbo")]
    GPT35Turbo,
    #[value(name = "gpt-4o-mini")]
    GPT4OMini,
    #[value(name = "text-embedding-ada-002")]
    TextEmbeddingAda002,
    #[value(name = "text-embedding-3-small")]
    TextEmbedding3Small,
    #[value(name = "text-embedding-3-large")]
    TextEmbedding3Large,
}

impl Default for WhichOpenAIAsset {
    fn default() -> Self {
        Self::GPT35Turbo
    }
}

impl WhichOpenAIAsset {
    /// The model name sent in the request body
    pub fn get_name(&self) -> &'static str {
        match self {
            Self::GPT35Turbo => "gpt-3.5-turbo",
            Self::GPT4OMini => "gpt-4o-mini",
            Self::TextEmbeddingAda002 => "text-embedding-ada-002",
            Self::TextEmbedding3Small => "text-embedding-3-small",
            Self::TextEmbedding3Large => "text-embedding-3-large",
        }
    }

    /// The base URL to access the asset
    pub fn get_endpoint(&self) -> &'static str {
        "https://api.openai.com/v1"
    }

    /// The request post extension
    pub fn get_post(&self) -> &'static str {
        if self.is_chat() {
            "chat/completions"
        } else {
            "embeddings"
        }
    }

    /// The endpoint post url
    ///
    /// # Arguments
    ///
    /// `endpoint` - Option<String>, base URL overriding the default endpoint
    pub fn get_api_url(&self, endpoint: Option<String>) -> String {
        let endpoint = endpoint.unwrap_or(self.get_endpoint().to_string());
        let url = format!("{}/{}", endpoint.trim_end_matches('/'), self.get_post());

        event!(Level::INFO, "OpenAI API endpoint url: {}", url.as_str());
        url
    }

    /// The user api key
    pub fn get_api_key(&self) -> ServerResult<String> {
        env::var("OPENAI_API_KEY")
            .map_err(|e| ServerError::Config(format!("OPENAI_API_KEY is not available: {e}")))
    }

    pub fn is_chat(&self) -> bool {
        match self {
            Self::GPT35Turbo | Self::GPT4OMini => true,
            Self::TextEmbeddingAda002 | Self::TextEmbedding3Small | Self::TextEmbedding3Large => {
                false
            }
        }
    }
}
