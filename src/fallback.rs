//! Sequential try-until-success over an ordered list of alternatives.
//!
//! Both the text model chain and the image provider fallback are built on
//! [`try_in_order`]. Alternatives are attempted one at a time in list order;
//! a later one is never started before the earlier one's failure has been
//! observed, and no alternative is retried.
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{AppError, AttemptFailure};

/// A successful result together with which alternative produced it.
#[derive(Debug)]
pub struct Outcome<T> {
    pub value: T,
    /// Name of the backend or provider that succeeded.
    pub provider: String,
    /// Zero-based position of that provider in the list.
    pub attempt: usize,
    /// Time from the first attempt starting until success.
    pub elapsed: Duration,
    /// Failures of every alternative tried before the successful one.
    pub failures: Vec<AttemptFailure>,
}

impl<T> Outcome<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        Outcome {
            value: f(self.value),
            provider: self.provider,
            attempt: self.attempt,
            elapsed: self.elapsed,
            failures: self.failures,
        }
    }

    pub fn meta(&self) -> OutcomeMeta {
        OutcomeMeta {
            provider: self.provider.clone(),
            attempt: self.attempt,
            elapsed_ms: self.elapsed.as_millis() as u64,
            failures: self.failures.clone(),
        }
    }
}

/// Serializable view of an [`Outcome`] without its payload.
#[derive(Debug, Clone, Serialize)]
pub struct OutcomeMeta {
    pub provider: String,
    pub attempt: usize,
    pub elapsed_ms: u64,
    pub failures: Vec<AttemptFailure>,
}

/// Run `attempt` against each candidate in order and return the first success.
///
/// Every attempt is bounded by `attempt_timeout`; an expired attempt is
/// dropped, which cancels any request it had in flight. On total failure the
/// per-candidate failures are returned in order so the caller can wrap them
/// in its own terminal error.
pub async fn try_in_order<C, T, F, Fut>(
    candidates: &[Arc<C>],
    attempt_timeout: Duration,
    label: impl Fn(&C) -> String,
    attempt: F,
) -> Result<Outcome<T>, Vec<AttemptFailure>>
where
    C: ?Sized,
    F: Fn(Arc<C>) -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
{
    let started = Instant::now();
    let mut failures = Vec::new();

    for (index, candidate) in candidates.iter().enumerate() {
        let name = label(candidate.as_ref());
        tracing::info!(provider = %name, attempt = index, "Trying provider");

        let result = match tokio::time::timeout(attempt_timeout, attempt(Arc::clone(candidate))).await {
            Ok(result) => result,
            Err(_) => Err(AppError::Timeout {
                provider: name.clone(),
                after: attempt_timeout,
            }),
        };

        match result {
            Ok(value) => {
                if index > 0 {
                    tracing::info!(provider = %name, attempt = index, "Succeeded on fallback provider");
                }
                return Ok(Outcome {
                    value,
                    provider: name,
                    attempt: index,
                    elapsed: started.elapsed(),
                    failures,
                });
            }
            Err(e) => {
                tracing::warn!(provider = %name, error = %e, "Error with {}. Trying next provider...", name);
                failures.push(AttemptFailure {
                    provider: name,
                    reason: e.to_string(),
                });
            }
        }
    }

    tracing::error!(attempts = failures.len(), "Every provider failed");
    Err(failures)
}
