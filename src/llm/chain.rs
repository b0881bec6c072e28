//! Model fallback chain.
//!
//! A [`FallbackChain`] holds an ordered, non-empty list of backends. Every
//! operation substitutes each backend in turn into the same pipeline and
//! returns the first success; when all of them fail the caller gets
//! [`AppError::AllBackendsExhausted`] with one entry per backend.
use futures::StreamExt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use super::types::{Backend, InvocationRequest, TextStream};
use crate::error::{AppError, AppResult};
use crate::fallback::{try_in_order, Outcome};
use crate::parse::parse_string;

pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct FallbackChain {
    backends: Vec<Arc<dyn Backend>>,
    attempt_timeout: Duration,
}

impl std::fmt::Debug for FallbackChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FallbackChain")
            .field("backends", &self.backend_names())
            .field("attempt_timeout", &self.attempt_timeout)
            .finish()
    }
}

impl FallbackChain {
    pub fn new(backends: Vec<Arc<dyn Backend>>) -> AppResult<Self> {
        if backends.is_empty() {
            return Err(AppError::Config("a fallback chain needs at least one backend".into()));
        }
        Ok(FallbackChain {
            backends,
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
        })
    }

    /// Fixed primary-then-secondary preference order.
    pub fn dual(primary: Arc<dyn Backend>, secondary: Arc<dyn Backend>) -> Self {
        FallbackChain {
            backends: vec![primary, secondary],
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
        }
    }

    pub fn with_attempt_timeout(mut self, attempt_timeout: Duration) -> Self {
        self.attempt_timeout = attempt_timeout;
        self
    }

    pub fn backend_names(&self) -> Vec<&str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    /// Run `pipeline` against each backend in order until one succeeds.
    pub async fn run<T, F, Fut>(&self, pipeline: F) -> AppResult<Outcome<T>>
    where
        F: Fn(Arc<dyn Backend>) -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        try_in_order(
            &self.backends,
            self.attempt_timeout,
            |backend| backend.name().to_string(),
            pipeline,
        )
        .await
        .map_err(|failures| AppError::AllBackendsExhausted { failures })
    }

    /// Single completion, parsed as plain text.
    pub async fn invoke(&self, request: &InvocationRequest) -> AppResult<Outcome<String>> {
        self.run(|backend| async move {
            let raw = backend.complete(request).await?;
            parse_string(&raw)
        })
        .await
    }

    pub async fn invoke_prompt(&self, prompt: &str) -> AppResult<Outcome<String>> {
        self.invoke(&InvocationRequest::from_prompt(prompt)).await
    }

    /// Open a token stream on the first backend that produces a chunk.
    ///
    /// The attempt only covers opening the stream and receiving its first
    /// chunk; errors after that arrive as stream items. Each later chunk must
    /// arrive within the attempt timeout or the stream ends with
    /// [`AppError::Timeout`].
    pub async fn stream(&self, request: &InvocationRequest) -> AppResult<Outcome<TextStream>> {
        let idle = self.attempt_timeout;
        self.run(|backend| async move {
            let mut stream = backend.stream(request).await?;
            match stream.next().await {
                Some(Ok(first)) => {
                    let head = futures::stream::once(async move { Ok(first) });
                    let rest = idle_bounded(backend.name().to_string(), stream, idle);
                    Ok(Box::pin(head.chain(rest)) as TextStream)
                }
                Some(Err(e)) => Err(e),
                None => Err(AppError::invalid_response(backend.name(), "stream ended before any output")),
            }
        })
        .await
    }

    /// Run every request on one backend; outputs line up with `requests`.
    pub async fn batch(&self, requests: &[InvocationRequest]) -> AppResult<Outcome<Vec<String>>> {
        self.run(|backend| async move {
            let mut outputs = Vec::with_capacity(requests.len());
            for request in requests {
                let raw = backend.complete(request).await?;
                outputs.push(parse_string(&raw)?);
            }
            Ok(outputs)
        })
        .await
    }
}

/// Yield items from `stream` until it ends or goes quiet for `idle`.
fn idle_bounded(provider: String, stream: TextStream, idle: Duration) -> TextStream {
    Box::pin(futures::stream::unfold(Some(stream), move |state| {
        let provider = provider.clone();
        async move {
            let mut stream = state?;
            match tokio::time::timeout(idle, stream.next()).await {
                Ok(Some(item)) => Some((item, Some(stream))),
                Ok(None) => None,
                Err(_) => {
                    tracing::warn!("{} went quiet mid-stream for {:?}", provider, idle);
                    Some((Err(AppError::Timeout { provider, after: idle }), None))
                }
            }
        }
    }))
}

/// Ask the primary backend, then the secondary one if the first fails.
pub async fn invoke_ai(
    primary: Arc<dyn Backend>,
    secondary: Arc<dyn Backend>,
    prompt: &str,
) -> AppResult<Outcome<String>> {
    FallbackChain::dual(primary, secondary).invoke_prompt(prompt).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::mock::{CallLog, MockBackend};

    fn chain_of(backends: Vec<MockBackend>) -> FallbackChain {
        FallbackChain::new(backends.into_iter().map(|b| Arc::new(b) as Arc<dyn Backend>).collect())
            .unwrap()
            .with_attempt_timeout(Duration::from_millis(200))
    }

    #[test]
    fn empty_chain_is_rejected() {
        assert!(matches!(FallbackChain::new(vec![]), Err(AppError::Config(_))));
    }

    #[tokio::test]
    async fn first_backend_success_never_touches_the_rest() {
        let log = CallLog::default();
        let chain = chain_of(vec![
            MockBackend::replying("a", "first", &log),
            MockBackend::replying("b", "second", &log),
        ]);
        let outcome = chain.invoke_prompt("hi").await.unwrap();
        assert_eq!(outcome.value, "first");
        assert_eq!(outcome.provider, "a");
        assert_eq!(log.calls(), vec!["a"]);
    }

    #[tokio::test]
    async fn failing_backend_falls_through_to_next() {
        let log = CallLog::default();
        let chain = chain_of(vec![
            MockBackend::failing("a", &log),
            MockBackend::replying("b", "ok", &log),
        ]);
        let outcome = chain.invoke_prompt("hi").await.unwrap();
        assert_eq!(outcome.value, "ok");
        assert_eq!(outcome.attempt, 1);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(log.calls(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn k_failures_then_success_invokes_k_plus_one_backends() {
        let log = CallLog::default();
        let chain = chain_of(vec![
            MockBackend::failing("a", &log),
            MockBackend::failing("b", &log),
            MockBackend::failing("c", &log),
            MockBackend::replying("d", "done", &log),
            MockBackend::replying("e", "unused", &log),
        ]);
        let outcome = chain.invoke_prompt("hi").await.unwrap();
        assert_eq!(outcome.value, "done");
        assert_eq!(log.calls(), vec!["a", "b", "c", "d"]);
    }

    #[tokio::test]
    async fn all_backends_failing_is_reported() {
        let log = CallLog::default();
        let chain = chain_of(vec![MockBackend::failing("a", &log), MockBackend::failing("b", &log)]);
        let err = chain.invoke_prompt("hi").await.unwrap_err();
        match err {
            AppError::AllBackendsExhausted { failures } => {
                let names: Vec<_> = failures.iter().map(|f| f.provider.as_str()).collect();
                assert_eq!(names, vec!["a", "b"]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(log.calls(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn blank_output_counts_as_failure() {
        let log = CallLog::default();
        let chain = chain_of(vec![
            MockBackend::replying("a", "   ", &log),
            MockBackend::replying("b", "text", &log),
        ]);
        let outcome = chain.invoke_prompt("hi").await.unwrap();
        assert_eq!(outcome.provider, "b");
    }

    #[tokio::test]
    async fn hung_backend_is_abandoned() {
        let log = CallLog::default();
        let chain = chain_of(vec![MockBackend::hanging("slow", &log), MockBackend::replying("b", "ok", &log)]);
        let outcome = chain.invoke_prompt("hi").await.unwrap();
        assert_eq!(outcome.value, "ok");
        assert!(outcome.failures[0].reason.contains("timed out"));
    }

    #[tokio::test]
    async fn stream_preserves_chunk_order_and_matches_completion() {
        let log = CallLog::default();
        let chain = chain_of(vec![MockBackend::chunked("a", &["Hel", "lo ", "there"], &log)]);
        let outcome = chain.stream(&InvocationRequest::from_prompt("hi")).await.unwrap();
        let chunks: Vec<String> = outcome.value.map(|c| c.unwrap()).collect().await;
        assert_eq!(chunks, vec!["Hel", "lo ", "there"]);

        let whole = chain.invoke_prompt("hi").await.unwrap().value;
        assert_eq!(chunks.concat(), whole);
    }

    #[tokio::test]
    async fn stream_that_cannot_open_falls_through() {
        let log = CallLog::default();
        let chain = chain_of(vec![
            MockBackend::failing("a", &log),
            MockBackend::chunked("b", &["x", "y"], &log),
        ]);
        let outcome = chain.stream(&InvocationRequest::from_prompt("hi")).await.unwrap();
        assert_eq!(outcome.provider, "b");
        let text: Vec<String> = outcome.value.map(|c| c.unwrap()).collect().await;
        assert_eq!(text.concat(), "xy");
    }

    #[tokio::test]
    async fn stalled_stream_ends_with_a_timeout() {
        let log = CallLog::default();
        let chain = chain_of(vec![MockBackend::stalling("a", "first", &log)]);
        let outcome = chain.stream(&InvocationRequest::from_prompt("hi")).await.unwrap();
        let items: Vec<AppResult<String>> = outcome.value.collect().await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_ref().unwrap(), "first");
        assert!(matches!(&items[1], Err(AppError::Timeout { provider, .. }) if provider == "a"));
    }

    #[tokio::test]
    async fn batch_outputs_align_with_inputs() {
        let log = CallLog::default();
        let chain = chain_of(vec![MockBackend::echoing("a", &log)]);
        let requests: Vec<_> = ["one", "two", "three"]
            .iter()
            .map(|p| InvocationRequest::from_prompt(*p))
            .collect();
        let outcome = chain.batch(&requests).await.unwrap();
        assert_eq!(outcome.value, vec!["echo: one", "echo: two", "echo: three"]);
        assert_eq!(log.calls().len(), 3);
    }

    #[tokio::test]
    async fn invoke_ai_prefers_primary_then_secondary() {
        let log = CallLog::default();
        let primary: Arc<dyn Backend> = Arc::new(MockBackend::failing("openai", &log));
        let secondary: Arc<dyn Backend> = Arc::new(MockBackend::replying("google", "hi there", &log));
        let outcome = invoke_ai(primary, secondary, "hello").await.unwrap();
        assert_eq!(outcome.value, "hi there");
        assert_eq!(log.calls(), vec!["openai", "google"]);
    }
}
