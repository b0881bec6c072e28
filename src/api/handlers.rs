//! Axum request handlers for the HTTP API.
use axum::extract::{Query, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use futures::{Stream, StreamExt};
use serde::Deserialize;
use serde_json::{json, Value};
use std::convert::Infallible;
use std::sync::Arc;

use crate::api::routes::AppState;
use crate::error::AppResult;
use crate::scenarios::{self, GenerateImageParams, ScenarioReport};

pub async fn root() -> &'static str {
    "Trade Prompt Proxy"
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "backends": state.chain.backend_names(),
        "image_providers": state.images.provider_names(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct AskParams {
    pub prompt: Option<String>,
}

pub async fn ask(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AskParams>,
) -> AppResult<Json<ScenarioReport>> {
    let prompt = params.prompt.unwrap_or_default();
    scenarios::ask(&state.chain, &prompt).await.map(Json)
}

pub async fn chains(State(state): State<Arc<AppState>>) -> AppResult<Json<ScenarioReport>> {
    scenarios::chains(&state.chain).await.map(Json)
}

pub async fn docs(State(state): State<Arc<AppState>>) -> AppResult<Json<ScenarioReport>> {
    scenarios::docs(&state.chain).await.map(Json)
}

pub async fn batches(State(state): State<Arc<AppState>>) -> AppResult<Json<ScenarioReport>> {
    scenarios::batches(&state.chain).await.map(Json)
}

pub async fn json(State(state): State<Arc<AppState>>) -> AppResult<Json<ScenarioReport>> {
    scenarios::json(&state.chain).await.map(Json)
}

pub async fn events(State(state): State<Arc<AppState>>) -> AppResult<Json<ScenarioReport>> {
    scenarios::events(&state.chain).await.map(Json)
}

pub async fn memory(State(state): State<Arc<AppState>>) -> AppResult<Json<ScenarioReport>> {
    scenarios::memory(&state.chain).await.map(Json)
}

pub async fn composed() -> AppResult<Json<ScenarioReport>> {
    scenarios::composed().map(Json)
}

fn sse_event(name: &str, data: Value) -> Event {
    Event::default().event(name).json_data(data).unwrap_or_else(|e| {
        tracing::error!("Failed to encode {} event: {}", name, e);
        Event::default().event("error").data("event encoding failed")
    })
}

/// Server-sent events: `meta`, then one `chunk` per model chunk, then `done`.
///
/// Fallback only happens before the first chunk; an error after that ends the
/// stream with an `error` event.
pub async fn stream(
    State(state): State<Arc<AppState>>,
) -> AppResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let outcome = scenarios::stream(&state.chain).await?;
    let meta = sse_event(
        "meta",
        json!({
            "provider": outcome.provider,
            "attempt": outcome.attempt,
            "time_to_first_chunk_ms": outcome.elapsed.as_millis() as u64,
            "failures": outcome.failures,
        }),
    );

    let chunks = outcome
        .value
        .scan(false, |failed, chunk| {
            if *failed {
                return futures::future::ready(None);
            }
            let event = match chunk {
                Ok(text) => sse_event("chunk", json!({ "text": text })),
                Err(e) => {
                    tracing::warn!("Stream broke off: {}", e);
                    *failed = true;
                    sse_event("error", json!({ "error": e.kind(), "message": e.to_string() }))
                }
            };
            futures::future::ready(Some(event))
        });
    let done = Event::default().event("done").data("[DONE]");

    let events = futures::stream::once(async move { meta })
        .chain(chunks)
        .chain(futures::stream::once(async move { done }))
        .map(Ok);
    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

pub async fn generate_image(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GenerateImageParams>,
) -> AppResult<Json<ScenarioReport>> {
    scenarios::generate_image(&state.chain, &state.images, &params)
        .await
        .map(Json)
}

#[derive(Debug, Deserialize)]
pub struct UpscaleParams {
    pub task_id: String,
    pub index: u8,
}

pub async fn upscale(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UpscaleParams>,
) -> AppResult<Json<ScenarioReport>> {
    scenarios::upscale(&state.images, &params.task_id, params.index)
        .await
        .map(Json)
}
