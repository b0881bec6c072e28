//! OpenAI chat completions backend.
//!
//! - `complete` posts to `/chat/completions` and returns the first choice.
//! - `stream` sets `stream: true` and yields `choices[0].delta.content`
//!   fragments from the SSE response.
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use super::types::{Backend, InvocationRequest, TextStream};
use crate::error::{AppError, AppResult};
use crate::utils::http::ensure_success;
use crate::utils::sse::data_events;

#[derive(Clone)]
pub struct OpenAiBackend {
    client: Client,
    name: String,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
}

impl std::fmt::Debug for OpenAiBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiBackend")
            .field("name", &self.name)
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl OpenAiBackend {
    pub fn new(api_key: String, base_url: String, model: String, max_tokens: u32) -> Self {
        OpenAiBackend {
            client: Client::new(),
            name: "openai".to_string(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            max_tokens,
        }
    }

    fn body(&self, request: &InvocationRequest, stream: bool) -> Value {
        json!({
            "model": self.model,
            "messages": request.messages,
            "max_tokens": request.max_tokens.unwrap_or(self.max_tokens),
            "stream": stream,
        })
    }

    async fn post(&self, body: &Value) -> AppResult<reqwest::Response> {
        let url = format!("{}/chat/completions", self.base_url);
        tracing::debug!("Sending completion request to {}: {}", url, body);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;
        ensure_success(&self.name, response).await
    }
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

/// Pull the text fragment out of one streamed completion chunk.
fn delta_content(provider: &str, data: &str) -> AppResult<Option<String>> {
    let chunk: Value = serde_json::from_str(data)
        .map_err(|e| AppError::invalid_response(provider, format!("bad stream chunk: {}", e)))?;
    if let Some(message) = chunk.get("error") {
        return Err(AppError::invalid_response(provider, message.to_string()));
    }
    Ok(chunk["choices"][0]["delta"]["content"]
        .as_str()
        .filter(|s| !s.is_empty())
        .map(str::to_string))
}

#[async_trait]
impl Backend for OpenAiBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: &InvocationRequest) -> AppResult<String> {
        let response = self.post(&self.body(request, false)).await?;
        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|e| AppError::invalid_response(&self.name, e.to_string()))?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AppError::invalid_response(&self.name, "response had no message content"))
    }

    async fn stream(&self, request: &InvocationRequest) -> AppResult<TextStream> {
        let response = self.post(&self.body(request, true)).await?;
        let provider = self.name.clone();
        let chunks = data_events(response.bytes_stream()).filter_map(move |event| {
            let parsed = event.and_then(|data| delta_content(&provider, &data));
            async move { parsed.transpose() }
        });
        Ok(Box::pin(chunks))
    }
}
