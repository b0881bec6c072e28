//! Text-generation backends and the model fallback chain.
//!
//! Modules:
//! - `types`: request/message types and the `Backend` trait.
//! - `openai`, `google`: HTTP adapters for the hosted APIs.
//! - `chain`: ordered try-until-success over backends.
pub mod chain;
pub mod google;
pub mod openai;
pub mod types;

#[cfg(test)]
pub(crate) mod mock;

use std::sync::Arc;

use crate::config::Config;
use crate::error::{AppError, AppResult};

pub use chain::{invoke_ai, FallbackChain};
pub use types::{Backend, ChatMessage, InvocationRequest, Role, TextStream};

/// Construct the backend registered under `name`.
pub fn backend_from_config(name: &str, config: &Config) -> AppResult<Arc<dyn Backend>> {
    match name {
        "openai" => Ok(Arc::new(openai::OpenAiBackend::new(
            config.openai_api_key.clone(),
            config.openai_api_url.clone(),
            config.openai_model.clone(),
            config.openai_max_tokens,
        ))),
        "google" => Ok(Arc::new(google::GoogleBackend::new(
            config.google_api_key.clone(),
            config.google_api_url.clone(),
            config.google_model.clone(),
            config.google_max_tokens,
        ))),
        other => Err(AppError::Config(format!("unknown backend '{}'", other))),
    }
}

/// Build the chain in `FALLBACK_ORDER`.
pub fn chain_from_config(config: &Config) -> AppResult<FallbackChain> {
    let backends = config
        .fallback_order
        .iter()
        .map(|name| backend_from_config(name, config))
        .collect::<AppResult<Vec<_>>>()?;
    Ok(FallbackChain::new(backends)?.with_attempt_timeout(config.attempt_timeout))
}
