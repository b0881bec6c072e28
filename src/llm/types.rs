use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;

use crate::error::AppResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// Provider-agnostic input to a single model invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationRequest {
    pub messages: Vec<ChatMessage>,
    /// Overrides the backend's configured output limit.
    pub max_tokens: Option<u32>,
}

impl InvocationRequest {
    pub fn from_prompt(prompt: impl Into<String>) -> Self {
        Self::from_messages(vec![ChatMessage::user(prompt)])
    }

    pub fn from_messages(messages: Vec<ChatMessage>) -> Self {
        Self { messages, max_tokens: None }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Incremental text chunks in arrival order.
pub type TextStream = Pin<Box<dyn Stream<Item = AppResult<String>> + Send>>;

/// A configured text-generation model behind some remote API.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Display name used in logs, fallback order and response metadata.
    fn name(&self) -> &str;

    async fn complete(&self, request: &InvocationRequest) -> AppResult<String>;

    /// Stream the completion. Backends without native streaming yield the
    /// full completion as a single chunk.
    async fn stream(&self, request: &InvocationRequest) -> AppResult<TextStream> {
        let text = self.complete(request).await?;
        Ok(Box::pin(futures::stream::once(async move { Ok(text) })))
    }
}
