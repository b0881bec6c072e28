use reqwest::Response;

use crate::error::{AppError, AppResult};

/// Pass a successful response through; turn anything else into
/// `ProviderUnavailable` carrying the status and response body.
pub async fn ensure_success(provider: &str, response: Response) -> AppResult<Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read error body".to_string());
    tracing::error!("{} request failed. Status: {}, Body: {}", provider, status, body);
    Err(AppError::ProviderUnavailable {
        provider: provider.to_string(),
        status: status.as_u16(),
        body,
    })
}
