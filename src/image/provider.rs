use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AppResult;

/// Provider-specific knobs. Each provider maps the ones it understands onto
/// its own request fields and ignores the rest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagineOptions {
    /// e.g. `16:9`; used by job-based providers.
    pub aspect_ratio: Option<String>,
    /// e.g. `1024x1024`; used by URL-returning providers.
    pub size: Option<String>,
}

/// Handle for an asynchronous generation job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobHandle {
    pub task_id: String,
    /// Full provider response, kept for status fields we do not model.
    pub raw: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImageResult {
    Url { url: String },
    Job(JobHandle),
}

#[async_trait]
pub trait ImageProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn imagine(&self, prompt: &str, options: &ImagineOptions) -> AppResult<ImageResult>;

    /// Request an upscaled variant (`index` is 1-based) of a finished job.
    async fn upscale(&self, task_id: &str, index: u8) -> AppResult<ImageResult>;
}
