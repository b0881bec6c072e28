//! Image provider fallback.
//!
//! The primary provider is asked first; on any failure the configured
//! fallbacks are tried in order, once each, with the identical prompt. The
//! provider list is fixed at construction.
use std::sync::Arc;
use std::time::Duration;

use super::provider::{ImageProvider, ImageResult, ImagineOptions};
use crate::error::{AppError, AppResult};
use crate::fallback::{try_in_order, Outcome};
use crate::llm::chain::DEFAULT_ATTEMPT_TIMEOUT;

#[derive(Clone)]
pub struct ImageFallback {
    /// Primary first, then fallbacks in order.
    providers: Vec<Arc<dyn ImageProvider>>,
    attempt_timeout: Duration,
}

impl std::fmt::Debug for ImageFallback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageFallback")
            .field("providers", &self.provider_names())
            .field("attempt_timeout", &self.attempt_timeout)
            .finish()
    }
}

impl ImageFallback {
    pub fn new(primary: Arc<dyn ImageProvider>, fallbacks: Vec<Arc<dyn ImageProvider>>) -> Self {
        let mut providers = Vec::with_capacity(fallbacks.len() + 1);
        providers.push(primary);
        providers.extend(fallbacks);
        ImageFallback {
            providers,
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
        }
    }

    pub fn with_attempt_timeout(mut self, attempt_timeout: Duration) -> Self {
        self.attempt_timeout = attempt_timeout;
        self
    }

    pub fn primary(&self) -> &Arc<dyn ImageProvider> {
        &self.providers[0]
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    pub async fn imagine(&self, prompt: &str, options: &ImagineOptions) -> AppResult<Outcome<ImageResult>> {
        tracing::info!(prompt, "imagine...");
        try_in_order(
            &self.providers,
            self.attempt_timeout,
            |provider| provider.name().to_string(),
            |provider| async move { provider.imagine(prompt, options).await },
        )
        .await
        .map_err(|failures| AppError::AllProvidersExhausted { failures })
    }

    /// Upscale on the primary provider. There is no fallback: the job only
    /// exists on the provider that created it.
    pub async fn upscale(&self, task_id: &str, index: u8) -> AppResult<ImageResult> {
        tracing::info!(task_id, index, "upscale...");
        let primary = self.primary();
        match tokio::time::timeout(self.attempt_timeout, primary.upscale(task_id, index)).await {
            Ok(result) => result,
            Err(_) => Err(AppError::Timeout {
                provider: primary.name().to_string(),
                after: self.attempt_timeout,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    type Calls = Arc<Mutex<Vec<(String, String)>>>;

    struct FakeProvider {
        name: &'static str,
        ok: bool,
        calls: Calls,
    }

    #[async_trait]
    impl ImageProvider for FakeProvider {
        fn name(&self) -> &str {
            self.name
        }

        async fn imagine(&self, prompt: &str, _options: &ImagineOptions) -> AppResult<ImageResult> {
            self.calls.lock().unwrap().push((self.name.to_string(), prompt.to_string()));
            if self.ok {
                Ok(ImageResult::Url {
                    url: format!("https://img/{}", self.name),
                })
            } else {
                Err(AppError::ProviderUnavailable {
                    provider: self.name.to_string(),
                    status: 500,
                    body: "down".into(),
                })
            }
        }

        async fn upscale(&self, _task_id: &str, _index: u8) -> AppResult<ImageResult> {
            self.calls.lock().unwrap().push((self.name.to_string(), "upscale".into()));
            Err(AppError::Unsupported("no".into()))
        }
    }

    fn fake(name: &'static str, ok: bool, calls: &Calls) -> Arc<dyn ImageProvider> {
        Arc::new(FakeProvider {
            name,
            ok,
            calls: Arc::clone(calls),
        })
    }

    fn names(calls: &Calls) -> Vec<String> {
        calls.lock().unwrap().iter().map(|(n, _)| n.clone()).collect()
    }

    #[tokio::test]
    async fn primary_success_skips_fallbacks() {
        let calls = Calls::default();
        let images = ImageFallback::new(fake("mj", true, &calls), vec![fake("dalle", true, &calls)]);
        let outcome = images.imagine("a roof", &ImagineOptions::default()).await.unwrap();
        assert_eq!(outcome.provider, "mj");
        assert_eq!(names(&calls), vec!["mj"]);
    }

    #[tokio::test]
    async fn primary_failure_uses_first_fallback_with_same_prompt() {
        let calls = Calls::default();
        let images = ImageFallback::new(
            fake("mj", false, &calls),
            vec![fake("dalle", true, &calls), fake("other", true, &calls)],
        );
        let outcome = images.imagine("a roof", &ImagineOptions::default()).await.unwrap();
        assert_eq!(
            outcome.value,
            ImageResult::Url {
                url: "https://img/dalle".into()
            }
        );
        let recorded = calls.lock().unwrap().clone();
        assert_eq!(
            recorded,
            vec![("mj".to_string(), "a roof".to_string()), ("dalle".to_string(), "a roof".to_string())]
        );
    }

    #[tokio::test]
    async fn exhausted_fallbacks_surface_an_error() {
        let calls = Calls::default();
        let images = ImageFallback::new(fake("mj", false, &calls), vec![fake("dalle", false, &calls)]);
        let err = images.imagine("x", &ImagineOptions::default()).await.unwrap_err();
        assert!(matches!(err, AppError::AllProvidersExhausted { ref failures } if failures.len() == 2));
    }

    #[tokio::test]
    async fn upscale_never_falls_back() {
        let calls = Calls::default();
        let images = ImageFallback::new(fake("mj", false, &calls), vec![fake("dalle", true, &calls)]);
        assert!(images.upscale("t1", 1).await.is_err());
        assert_eq!(names(&calls), vec!["mj"]);
    }
}
