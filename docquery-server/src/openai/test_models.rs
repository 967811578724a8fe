//! Deterministic stand-ins for the chat and embedding models

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{
    chat_completion::ChatCompletionMessage,
    openai_client::{ChatModel, EmbeddingModel},
};
use crate::error::{ServerError, ServerResult};

/// Replies with a fixed answer and remembers the prompts it was given
#[derive(Default)]
pub struct MockChat {
    pub answer: String,
    pub prompts: Mutex<Vec<String>>,
}

impl MockChat {
    pub fn new(answer: &str) -> Self {
        Self {
            answer: answer.to_string(),
            prompts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ChatModel for MockChat {
    async fn complete(&self, messages: Vec<ChatCompletionMessage>) -> ServerResult<String> {
        self.prompts
            .lock()
            .extend(messages.into_iter().map(|m| m.content));
        Ok(self.answer.clone())
    }
}

/// Always fails as an unreachable API would
pub struct FailingChat;

#[async_trait]
impl ChatModel for FailingChat {
    async fn complete(&self, _messages: Vec<ChatCompletionMessage>) -> ServerResult<String> {
        Err(ServerError::Upstream("connection refused".to_string()))
    }
}

/// Embeds text as normalized letter counts over `a..=z`
#[derive(Default)]
pub struct LetterEmbedder;

impl LetterEmbedder {
    pub fn embed_one(text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0f32; 26];
        for c in text.chars().filter(|c| c.is_ascii_alphabetic()) {
            embedding[(c.to_ascii_lowercase() as u8 - b'a') as usize] += 1.0;
        }
        let norm = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            embedding.iter_mut().for_each(|x| *x /= norm);
        }
        embedding
    }
}

#[async_trait]
impl EmbeddingModel for LetterEmbedder {
    async fn embed(&self, inputs: Vec<String>) -> ServerResult<Vec<Vec<f32>>> {
        Ok(inputs.iter().map(|s| Self::embed_one(s)).collect())
    }
}
