//! Midjourney-style job API (GoAPI `mj/v2`).
//!
//! - `imagine` posts to `/imagine` and returns a job handle.
//! - `upscale` posts to `/upscale` for a variant of a finished job.
//! Results are delivered later, either to `webhook_endpoint` or by polling
//! the provider; neither happens in this service.
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::provider::{ImageProvider, ImageResult, ImagineOptions, JobHandle};
use crate::error::{AppError, AppResult};
use crate::utils::http::ensure_success;

pub const DEFAULT_ASPECT_RATIO: &str = "1:1";

#[derive(Clone)]
pub struct MidjourneyProvider {
    client: Client,
    api_key: String,
    base_url: String,
    webhook_url: String,
    process_mode: String,
}

impl std::fmt::Debug for MidjourneyProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MidjourneyProvider")
            .field("base_url", &self.base_url)
            .field("process_mode", &self.process_mode)
            .finish()
    }
}

impl MidjourneyProvider {
    pub fn new(api_key: String, base_url: String, webhook_url: String, process_mode: String) -> Self {
        MidjourneyProvider {
            client: Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            webhook_url,
            process_mode,
        }
    }

    fn imagine_body(&self, prompt: &str, options: &ImagineOptions) -> Value {
        json!({
            "prompt": prompt,
            "aspect_ratio": options.aspect_ratio.as_deref().unwrap_or(DEFAULT_ASPECT_RATIO),
            "process_mode": self.process_mode,
            "webhook_endpoint": self.webhook_url,
        })
    }

    async fn post(&self, path: &str, body: Value) -> AppResult<ImageResult> {
        let url = format!("{}/{}", self.base_url, path);
        tracing::info!("Sending {} request to {}", path, url);
        tracing::debug!("Payload: {}", body);

        let response = self
            .client
            .post(&url)
            .header("X-API-KEY", &self.api_key)
            .json(&body)
            .send()
            .await?;
        let response = ensure_success(self.name(), response).await?;
        let raw: Value = response
            .json()
            .await
            .map_err(|e| AppError::invalid_response(self.name(), e.to_string()))?;
        tracing::info!("{} accepted. Response: {}", path, raw);
        job_from_response(self.name(), raw)
    }
}

/// Accept `task_id` at the top level or under `data`.
fn job_from_response(provider: &str, raw: Value) -> AppResult<ImageResult> {
    let task_id = raw
        .get("task_id")
        .or_else(|| raw.get("data").and_then(|d| d.get("task_id")))
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .ok_or_else(|| AppError::invalid_response(provider, format!("missing task_id in {}", raw)))?;
    Ok(ImageResult::Job(JobHandle { task_id, raw }))
}

#[async_trait]
impl ImageProvider for MidjourneyProvider {
    fn name(&self) -> &str {
        "midjourney"
    }

    async fn imagine(&self, prompt: &str, options: &ImagineOptions) -> AppResult<ImageResult> {
        self.post("imagine", self.imagine_body(prompt, options)).await
    }

    async fn upscale(&self, task_id: &str, index: u8) -> AppResult<ImageResult> {
        if !(1..=4).contains(&index) {
            return Err(AppError::InvalidInput(format!("upscale index must be 1-4, got {}", index)));
        }
        let body = json!({
            "origin_task_id": task_id,
            "index": index.to_string(),
            "webhook_endpoint": self.webhook_url,
        });
        self.post("upscale", body).await
    }
}
