use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::config::Config;
use crate::error::AppResult;
use crate::image::{image_fallback_from_config, ImageFallback};
use crate::llm::{chain_from_config, FallbackChain};

pub struct AppState {
    pub chain: FallbackChain,
    pub images: ImageFallback,
}

impl AppState {
    pub fn from_config(config: &Config) -> AppResult<Self> {
        Ok(AppState {
            chain: chain_from_config(config)?,
            images: image_fallback_from_config(config)?,
        })
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/ask", get(handlers::ask))
        .route("/chains", get(handlers::chains))
        .route("/docs", get(handlers::docs))
        .route("/stream", get(handlers::stream))
        .route("/batches", get(handlers::batches))
        .route("/json", get(handlers::json))
        .route("/events", get(handlers::events))
        .route("/memory", get(handlers::memory))
        .route("/composed", get(handlers::composed))
        .route("/generateImage", get(handlers::generate_image))
        .route("/upscale", get(handlers::upscale))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
