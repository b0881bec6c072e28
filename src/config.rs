//! Env-driven configuration for the service and library.
//!
//! Values are read from the process environment; `dotenv` is loaded on demand
//! by the binaries. Defaults are provided for convenience during development.
//! Provider order for both fallback chains is configurable, so chain depth is
//! not fixed.
use std::env;
use std::time::Duration;

use crate::error::{AppError, AppResult};

const DEFAULT_ATTEMPT_TIMEOUT_SECS: u64 = 60;

#[derive(Clone, Debug)]
pub struct Config {
    pub api_host: String,
    pub api_port: String,

    pub openai_api_key: String,
    pub openai_api_url: String,
    pub openai_model: String,
    pub openai_max_tokens: u32,

    pub google_api_key: String,
    pub google_api_url: String,
    pub google_model: String,
    pub google_max_tokens: u32,

    /// Backend names in trial order, e.g. `openai,google`.
    pub fallback_order: Vec<String>,

    pub midjourney_api_key: String,
    pub midjourney_api_url: String,
    pub midjourney_webhook_url: String,
    pub midjourney_process_mode: String,

    pub dalle_api_url: String,
    /// Image providers tried after the primary, in order.
    pub image_fallbacks: Vec<String>,

    pub attempt_timeout: Duration,
}

impl Config {
    pub fn dotenv_load() {
        dotenv::dotenv().ok();
    }

    pub fn new() -> AppResult<Self> {
        let config = Config {
            api_host: var_or("API_HOST", "127.0.0.1"),
            api_port: var_or("API_PORT", "3000"),

            openai_api_key: var_or("OPEN_AI_KEY", ""),
            openai_api_url: var_or("OPENAI_API_URL", "https://api.openai.com/v1"),
            openai_model: var_or("OPENAI_MODEL", "gpt-4-vision-preview"),
            openai_max_tokens: parse_var("OPENAI_MAX_TOKENS", 250)?,

            google_api_key: var_or("GOOGLE_AI_KEY", ""),
            google_api_url: var_or(
                "GOOGLE_API_URL",
                "https://generativelanguage.googleapis.com/v1beta",
            ),
            google_model: var_or("GOOGLE_MODEL", "gemini-pro"),
            google_max_tokens: parse_var("GOOGLE_MAX_TOKENS", 2048)?,

            fallback_order: split_list(&var_or("FALLBACK_ORDER", "openai,google")),

            midjourney_api_key: var_or("GO_API_KEY", ""),
            midjourney_api_url: var_or("MIDJOURNEY_API_URL", "https://api.midjourneyapi.xyz/mj/v2"),
            midjourney_webhook_url: var_or("MIDJOURNEY_WEBHOOK_URL", ""),
            midjourney_process_mode: var_or("MIDJOURNEY_PROCESS_MODE", "fast"),

            dalle_api_url: var_or("DALLE_API_URL", "https://api.openai.com/v1/images"),
            image_fallbacks: split_list(&var_or("IMAGE_FALLBACKS", "dalle")),

            attempt_timeout: Duration::from_secs(parse_var(
                "ATTEMPT_TIMEOUT_SECS",
                DEFAULT_ATTEMPT_TIMEOUT_SECS,
            )?),
        };
        if config.fallback_order.is_empty() {
            return Err(AppError::Config("FALLBACK_ORDER must name at least one backend".into()));
        }
        Ok(config)
    }

    pub fn print_env_vars() {
        for key in [
            "API_HOST",
            "API_PORT",
            "OPENAI_API_URL",
            "OPENAI_MODEL",
            "GOOGLE_API_URL",
            "GOOGLE_MODEL",
            "FALLBACK_ORDER",
            "MIDJOURNEY_API_URL",
            "DALLE_API_URL",
            "IMAGE_FALLBACKS",
            "ATTEMPT_TIMEOUT_SECS",
        ] {
            tracing::info!("{}: {}", key, env::var(key).unwrap_or_else(|_| "<unset>".to_string()));
        }
        for key in ["OPEN_AI_KEY", "GOOGLE_AI_KEY", "GO_API_KEY"] {
            let shown = match env::var(key) {
                Ok(v) if !v.is_empty() => "<set>",
                _ => "<unset>",
            };
            tracing::info!("{}: {}", key, shown);
        }
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T: std::str::FromStr>(key: &str, default: T) -> AppResult<T> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{} has an invalid value '{}'", key, raw))),
        Err(_) => Ok(default),
    }
}

/// Comma-separated names, lowercased.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_ascii_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}
