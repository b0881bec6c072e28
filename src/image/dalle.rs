//! DALL-E style synchronous image API: one request, one image URL.
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::provider::{ImageProvider, ImageResult, ImagineOptions};
use crate::error::{AppError, AppResult};
use crate::utils::http::ensure_success;

pub const DEFAULT_SIZE: &str = "1024x1024";
const MODEL: &str = "dall-e-3";

#[derive(Clone)]
pub struct DalleProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl std::fmt::Debug for DalleProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DalleProvider").field("base_url", &self.base_url).finish()
    }
}

impl DalleProvider {
    pub fn new(api_key: String, base_url: String) -> Self {
        DalleProvider {
            client: Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn body(prompt: &str, options: &ImagineOptions) -> Value {
        json!({
            "model": MODEL,
            "n": 1,
            "prompt": prompt,
            "size": options.size.as_deref().unwrap_or(DEFAULT_SIZE),
        })
    }
}

#[async_trait]
impl ImageProvider for DalleProvider {
    fn name(&self) -> &str {
        "dalle"
    }

    async fn imagine(&self, prompt: &str, options: &ImagineOptions) -> AppResult<ImageResult> {
        let url = format!("{}/generations", self.base_url);
        tracing::info!("Sending generation request to {}", url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&Self::body(prompt, options))
            .send()
            .await?;
        let response = ensure_success(self.name(), response).await?;
        let payload: Value = response
            .json()
            .await
            .map_err(|e| AppError::invalid_response(self.name(), e.to_string()))?;
        payload["data"][0]["url"]
            .as_str()
            .map(|url| ImageResult::Url { url: url.to_string() })
            .ok_or_else(|| AppError::invalid_response(self.name(), "missing data[0].url"))
    }

    async fn upscale(&self, _task_id: &str, _index: u8) -> AppResult<ImageResult> {
        Err(AppError::Unsupported(format!("{} returns final images; upscale is not available", self.name())))
    }
}
