//! Trade Prompt Proxy library
//!
//! Modules:
//! - `api`: Axum HTTP handlers and router setup used by the binary.
//! - `llm`: Text backends (OpenAI, Gemini) and the model fallback chain.
//! - `image`: Image providers (Midjourney, DALL-E) and the image fallback.
//! - `fallback`: Sequential try-until-success shared by both chains.
//! - `prompt`: Templates, chat/pipeline prompts and the section catalog.
//! - `parse`: Output parsers for plain text and (streamed) JSON.
//! - `memory`: Conversation buffer for chat prompts.
//! - `scenarios`: The demo pipelines behind each endpoint.
//! - `utils`: HTTP status and SSE decoding helpers.
//! - `config`: Env-driven configuration loader.
//! - `error`: Common error type and alias.
//!
//! Re-exports are provided for common types: `Config`, `FallbackChain`,
//! `ImageFallback` and `AppError`.
pub mod api;
pub mod config;
pub mod error;
pub mod fallback;
pub mod image;
pub mod llm;
pub mod memory;
pub mod parse;
pub mod prompt;
pub mod scenarios;
pub mod utils;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use image::ImageFallback;
pub use llm::FallbackChain;
