//! Local fake provider servers for integration tests.
#![allow(dead_code)]

use axum::extract::Query;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

/// Request bodies (and selected headers) a fake server received.
#[derive(Clone, Default)]
pub struct Recorder(Arc<Mutex<Vec<Value>>>);

impl Recorder {
    pub fn record(&self, value: Value) {
        self.0.lock().unwrap().push(value);
    }

    pub fn requests(&self) -> Vec<Value> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.0.lock().unwrap().len()
    }
}

/// Serve `app` on an ephemeral local port and return its base URL.
pub async fn spawn(app: Router) -> String {
    let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
    let server = axum::Server::bind(&addr).serve(app.into_make_service());
    let addr = server.local_addr();
    tokio::spawn(async move {
        server.await.unwrap();
    });
    format!("http://{}", addr)
}

fn event_stream(payloads: Vec<Value>) -> Response {
    let mut body = String::new();
    for payload in payloads {
        body.push_str(&format!("data: {}\n\n", payload));
    }
    body.push_str("data: [DONE]\n\n");
    ([(header::CONTENT_TYPE, "text/event-stream")], body).into_response()
}

fn unavailable() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response()
}

/// OpenAI-style `/chat/completions`. `chunks` are joined for plain
/// completions and sent one per event when `stream` is set. `None` answers
/// every request with HTTP 500.
pub async fn fake_openai(chunks: Option<Vec<&'static str>>, recorder: Recorder) -> String {
    let app = Router::new().route(
        "/chat/completions",
        post(move |headers: HeaderMap, Json(body): Json<Value>| {
            let recorder = recorder.clone();
            let chunks = chunks.clone();
            async move {
                let auth = headers
                    .get(header::AUTHORIZATION)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                recorder.record(json!({"authorization": auth, "body": body}));
                let Some(chunks) = chunks else {
                    return unavailable();
                };
                if body["stream"] == json!(true) {
                    let events = chunks
                        .iter()
                        .map(|c| json!({"choices": [{"delta": {"content": c}}]}))
                        .collect();
                    event_stream(events)
                } else {
                    Json(json!({"choices": [{"message": {"role": "assistant", "content": chunks.concat()}}]}))
                        .into_response()
                }
            }
        }),
    );
    spawn(app).await
}

/// Gemini-style `/models/{model}:{method}`.
pub async fn fake_google(chunks: Option<Vec<&'static str>>, recorder: Recorder) -> String {
    let app = Router::new().route(
        "/models/:call",
        post(
            move |axum::extract::Path(call): axum::extract::Path<String>,
                  Query(query): Query<HashMap<String, String>>,
                  Json(body): Json<Value>| {
                let recorder = recorder.clone();
                let chunks = chunks.clone();
                async move {
                    recorder.record(json!({"call": call, "query": query, "body": body}));
                    let Some(chunks) = chunks else {
                        return unavailable();
                    };
                    let candidate = |text: &str| json!({"candidates": [{"content": {"parts": [{"text": text}]}}]});
                    if call.ends_with(":streamGenerateContent") {
                        event_stream(chunks.iter().map(|c| candidate(*c)).collect())
                    } else {
                        Json(candidate(&chunks.concat())).into_response()
                    }
                }
            },
        ),
    );
    spawn(app).await
}

/// Midjourney-style job API; `ok == false` fails every call with HTTP 500.
pub async fn fake_midjourney(ok: bool, recorder: Recorder) -> String {
    let handler = move |path: &'static str| {
        let recorder = recorder.clone();
        move |headers: HeaderMap, Json(body): Json<Value>| {
            let recorder = recorder.clone();
            async move {
                let key = headers
                    .get("x-api-key")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                recorder.record(json!({"path": path, "x_api_key": key, "body": body}));
                if !ok {
                    return unavailable();
                }
                Json(json!({"task_id": format!("{}-task", path), "status": "pending"})).into_response()
            }
        }
    };
    let app = Router::new()
        .route("/imagine", post(handler("imagine")))
        .route("/upscale", post(handler("upscale")));
    spawn(app).await
}

/// DALL-E-style `/generations`.
pub async fn fake_dalle(ok: bool, recorder: Recorder) -> String {
    let app = Router::new().route(
        "/generations",
        post(move |Json(body): Json<Value>| {
            let recorder = recorder.clone();
            async move {
                recorder.record(body);
                if !ok {
                    return unavailable();
                }
                Json(json!({"created": 1, "data": [{"url": "https://images.test/fence.png"}]})).into_response()
            }
        }),
    );
    spawn(app).await
}
