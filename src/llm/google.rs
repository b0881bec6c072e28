//! Google Gemini backend (`generateContent` / `streamGenerateContent`).
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde_json::{json, Value};

use super::types::{Backend, InvocationRequest, Role, TextStream};
use crate::error::{AppError, AppResult};
use crate::utils::http::ensure_success;
use crate::utils::sse::data_events;

#[derive(Clone)]
pub struct GoogleBackend {
    client: Client,
    name: String,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
}

impl std::fmt::Debug for GoogleBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleBackend")
            .field("name", &self.name)
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl GoogleBackend {
    pub fn new(api_key: String, base_url: String, model: String, max_tokens: u32) -> Self {
        GoogleBackend {
            client: Client::new(),
            name: "google".to_string(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            max_tokens,
        }
    }

    /// Gemini takes system text separately and calls the assistant `model`.
    fn body(&self, request: &InvocationRequest) -> Value {
        let system: Vec<&str> = request
            .messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
            .collect();
        let contents: Vec<Value> = request
            .messages
            .iter()
            .filter(|m| m.role != Role::System)
            .map(|m| {
                let role = if m.role == Role::Assistant { "model" } else { "user" };
                json!({"role": role, "parts": [{"text": m.content}]})
            })
            .collect();

        let mut body = json!({
            "contents": contents,
            "generationConfig": {
                "maxOutputTokens": request.max_tokens.unwrap_or(self.max_tokens),
            },
        });
        if !system.is_empty() {
            body["systemInstruction"] = json!({"parts": [{"text": system.join("\n")}]});
        }
        body
    }

    async fn post(&self, method: &str, body: &Value, sse: bool) -> AppResult<reqwest::Response> {
        let url = format!("{}/models/{}:{}", self.base_url, self.model, method);
        tracing::debug!("Sending {} request to {}: {}", method, url, body);
        let mut query = vec![("key", self.api_key.as_str())];
        if sse {
            query.push(("alt", "sse"));
        }
        let response = self.client.post(&url).query(&query).json(body).send().await?;
        ensure_success(&self.name, response).await
    }
}

/// Concatenate the text parts of the first candidate. `None` means the
/// payload carried no candidate at all.
fn candidate_text(provider: &str, payload: &Value) -> AppResult<Option<String>> {
    if let Some(error) = payload.get("error") {
        return Err(AppError::invalid_response(provider, error.to_string()));
    }
    let Some(candidate) = payload["candidates"].get(0) else {
        if let Some(reason) = payload["promptFeedback"]["blockReason"].as_str() {
            return Err(AppError::invalid_response(provider, format!("prompt blocked: {}", reason)));
        }
        return Ok(None);
    };
    let text: String = candidate["content"]["parts"]
        .as_array()
        .map(|parts| parts.iter().filter_map(|p| p["text"].as_str()).collect())
        .unwrap_or_default();
    Ok(Some(text))
}

#[async_trait]
impl Backend for GoogleBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: &InvocationRequest) -> AppResult<String> {
        let response = self.post("generateContent", &self.body(request), false).await?;
        let payload: Value = response
            .json()
            .await
            .map_err(|e| AppError::invalid_response(&self.name, e.to_string()))?;
        candidate_text(&self.name, &payload)?
            .ok_or_else(|| AppError::invalid_response(&self.name, "response had no candidates"))
    }

    async fn stream(&self, request: &InvocationRequest) -> AppResult<TextStream> {
        let response = self.post("streamGenerateContent", &self.body(request), true).await?;
        let provider = self.name.clone();
        let chunks = data_events(response.bytes_stream()).filter_map(move |event| {
            let parsed = event.and_then(|data| {
                let payload: Value = serde_json::from_str(&data).map_err(|e| {
                    AppError::invalid_response(&provider, format!("bad stream chunk: {}", e))
                })?;
                Ok(candidate_text(&provider, &payload)?.filter(|t| !t.is_empty()))
            });
            async move { parsed.transpose() }
        });
        Ok(Box::pin(chunks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::types::ChatMessage;

    #[test]
    fn body_splits_system_text_and_renames_assistant() {
        let backend = GoogleBackend::new("k".into(), "http://g".into(), "gemini-pro".into(), 2048);
        let request = InvocationRequest::from_messages(vec![
            ChatMessage::system("be brief"),
            ChatMessage::user("hi"),
            ChatMessage::assistant("hello"),
        ]);
        let body = backend.body(&request);
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "be brief");
        assert_eq!(body["contents"].as_array().unwrap().len(), 2);
        assert_eq!(body["contents"][1]["role"], "model");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 2048);
    }

    #[test]
    fn candidate_text_joins_parts() {
        let payload = json!({"candidates": [{"content": {"parts": [{"text": "a"}, {"text": "b"}]}}]});
        assert_eq!(candidate_text("google", &payload).unwrap().as_deref(), Some("ab"));
    }

    #[test]
    fn blocked_prompt_is_an_error() {
        let payload = json!({"promptFeedback": {"blockReason": "SAFETY"}});
        assert!(candidate_text("google", &payload).is_err());
        assert_eq!(candidate_text("google", &json!({})).unwrap(), None);
    }
}
