//! Common error type for providers, fallback chains and the HTTP layer.
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

/// One failed attempt inside a fallback chain.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AttemptFailure {
    pub provider: String,
    pub reason: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("{provider} unavailable (status {status}): {body}")]
    ProviderUnavailable {
        provider: String,
        status: u16,
        body: String,
    },

    #[error("{provider} returned an invalid response: {message}")]
    InvalidResponse { provider: String, message: String },

    #[error("{provider} timed out after {after:?}")]
    Timeout { provider: String, after: Duration },

    #[error("Output parsing error: {0}")]
    OutputParse(String),

    #[error("Prompt construction error: {0}")]
    PromptConstruction(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("All {} backends failed", failures.len())]
    AllBackendsExhausted { failures: Vec<AttemptFailure> },

    #[error("All {} image providers failed", failures.len())]
    AllProvidersExhausted { failures: Vec<AttemptFailure> },
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn invalid_response(provider: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::InvalidResponse {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Short machine-readable name used in HTTP error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::HttpClient(_) => "provider_unavailable",
            AppError::ProviderUnavailable { .. } => "provider_unavailable",
            AppError::InvalidResponse { .. } => "invalid_response",
            AppError::Timeout { .. } => "timeout",
            AppError::OutputParse(_) => "output_parse",
            AppError::PromptConstruction(_) => "prompt_construction",
            AppError::InvalidInput(_) => "invalid_input",
            AppError::Config(_) => "config",
            AppError::Unsupported(_) => "unsupported",
            AppError::AllBackendsExhausted { .. } => "all_backends_exhausted",
            AppError::AllProvidersExhausted { .. } => "all_providers_exhausted",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::HttpClient(_)
            | AppError::ProviderUnavailable { .. }
            | AppError::InvalidResponse { .. }
            | AppError::AllBackendsExhausted { .. }
            | AppError::AllProvidersExhausted { .. } => StatusCode::BAD_GATEWAY,
            AppError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            AppError::OutputParse(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::PromptConstruction(_) | AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::Unsupported(_) => StatusCode::NOT_IMPLEMENTED,
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn failures(&self) -> &[AttemptFailure] {
        match self {
            AppError::AllBackendsExhausted { failures }
            | AppError::AllProvidersExhausted { failures } => failures,
            _ => &[],
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(kind = self.kind(), "{}", self);
        let body = json!({
            "error": self.kind(),
            "message": self.to_string(),
            "failures": self.failures(),
        });
        (self.status_code(), Json(body)).into_response()
    }
}
