//! In-process backends for unit tests.
use async_trait::async_trait;
use futures::StreamExt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::types::{Backend, InvocationRequest, Role, TextStream};
use crate::error::{AppError, AppResult};

/// Shared record of which backends were called, in call order.
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn calls(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    fn record(&self, name: &str) {
        self.0.lock().unwrap().push(name.to_string());
    }
}

enum Behavior {
    Reply(String),
    Chunks(Vec<String>),
    Echo,
    Fail,
    Hang,
    Stall(String),
    Script(Mutex<Vec<String>>),
}

pub struct MockBackend {
    name: String,
    behavior: Behavior,
    log: CallLog,
    seen: Arc<Mutex<Vec<InvocationRequest>>>,
}

impl MockBackend {
    fn new(name: &str, behavior: Behavior, log: &CallLog) -> Self {
        MockBackend {
            name: name.to_string(),
            behavior,
            log: log.clone(),
            seen: Arc::default(),
        }
    }

    pub fn replying(name: &str, reply: &str, log: &CallLog) -> Self {
        Self::new(name, Behavior::Reply(reply.to_string()), log)
    }

    pub fn chunked(name: &str, chunks: &[&str], log: &CallLog) -> Self {
        Self::new(name, Behavior::Chunks(chunks.iter().map(|c| c.to_string()).collect()), log)
    }

    /// Replies with `echo: <last user message>`.
    pub fn echoing(name: &str, log: &CallLog) -> Self {
        Self::new(name, Behavior::Echo, log)
    }

    pub fn failing(name: &str, log: &CallLog) -> Self {
        Self::new(name, Behavior::Fail, log)
    }

    pub fn hanging(name: &str, log: &CallLog) -> Self {
        Self::new(name, Behavior::Hang, log)
    }

    /// Streams one chunk, then never sends another.
    pub fn stalling(name: &str, first: &str, log: &CallLog) -> Self {
        Self::new(name, Behavior::Stall(first.to_string()), log)
    }

    /// Replies with each scripted answer in turn, then fails.
    pub fn scripted(name: &str, replies: &[&str], log: &CallLog) -> Self {
        let mut replies: Vec<String> = replies.iter().map(|r| r.to_string()).collect();
        replies.reverse();
        Self::new(name, Behavior::Script(Mutex::new(replies)), log)
    }

    /// Requests this backend has received so far.
    pub fn requests(&self) -> Arc<Mutex<Vec<InvocationRequest>>> {
        Arc::clone(&self.seen)
    }

    fn failure(&self) -> AppError {
        AppError::ProviderUnavailable {
            provider: self.name.clone(),
            status: 500,
            body: "mock failure".to_string(),
        }
    }
}

#[async_trait]
impl Backend for MockBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: &InvocationRequest) -> AppResult<String> {
        self.log.record(&self.name);
        self.seen.lock().unwrap().push(request.clone());
        match &self.behavior {
            Behavior::Reply(text) => Ok(text.clone()),
            Behavior::Chunks(chunks) => Ok(chunks.concat()),
            Behavior::Echo => {
                let last = request
                    .messages
                    .iter()
                    .rev()
                    .find(|m| m.role == Role::User)
                    .map(|m| m.content.clone())
                    .unwrap_or_default();
                Ok(format!("echo: {}", last))
            }
            Behavior::Fail => Err(self.failure()),
            Behavior::Hang | Behavior::Stall(_) => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Err(self.failure())
            }
            Behavior::Script(replies) => replies.lock().unwrap().pop().ok_or_else(|| self.failure()),
        }
    }

    async fn stream(&self, request: &InvocationRequest) -> AppResult<TextStream> {
        match &self.behavior {
            Behavior::Chunks(chunks) => {
                self.log.record(&self.name);
                self.seen.lock().unwrap().push(request.clone());
                let items: Vec<AppResult<String>> = chunks.iter().cloned().map(Ok).collect();
                Ok(Box::pin(futures::stream::iter(items)))
            }
            Behavior::Stall(first) => {
                self.log.record(&self.name);
                let first = first.clone();
                let head = futures::stream::once(async move { Ok(first) });
                Ok(Box::pin(head.chain(futures::stream::pending())))
            }
            _ => {
                let text = self.complete(request).await?;
                Ok(Box::pin(futures::stream::once(async move { Ok(text) })))
            }
        }
    }
}
