//! Image generation providers and the primary/fallback coordinator.
pub mod dalle;
pub mod fallback;
pub mod midjourney;
pub mod provider;

use std::sync::Arc;

use crate::config::Config;
use crate::error::{AppError, AppResult};

pub use fallback::ImageFallback;
pub use provider::{ImageProvider, ImageResult, ImagineOptions, JobHandle};

pub fn provider_from_config(name: &str, config: &Config) -> AppResult<Arc<dyn ImageProvider>> {
    match name {
        "midjourney" => Ok(Arc::new(midjourney::MidjourneyProvider::new(
            config.midjourney_api_key.clone(),
            config.midjourney_api_url.clone(),
            config.midjourney_webhook_url.clone(),
            config.midjourney_process_mode.clone(),
        ))),
        "dalle" => Ok(Arc::new(dalle::DalleProvider::new(
            config.openai_api_key.clone(),
            config.dalle_api_url.clone(),
        ))),
        other => Err(AppError::Config(format!("unknown image provider '{}'", other))),
    }
}

/// Midjourney as primary, then `IMAGE_FALLBACKS` in order.
pub fn image_fallback_from_config(config: &Config) -> AppResult<ImageFallback> {
    let primary = provider_from_config("midjourney", config)?;
    let fallbacks = config
        .image_fallbacks
        .iter()
        .map(|name| provider_from_config(name, config))
        .collect::<AppResult<Vec<_>>>()?;
    Ok(ImageFallback::new(primary, fallbacks).with_attempt_timeout(config.attempt_timeout))
}
