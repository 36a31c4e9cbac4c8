//! Mapping from HTTP/transport failures to [`ProviderError`].

use std::time::Duration;

use harness_types::ProviderError;

/// Map an OpenAI-compatible HTTP status code to a [`ProviderError`].
pub(crate) fn map_http_status(status: reqwest::StatusCode, body: &str) -> ProviderError {
    match status.as_u16() {
        401 | 403 => ProviderError::AuthFailed(body.to_string()),
        429 => ProviderError::RateLimited,
        400 | 404 => ProviderError::InvalidResponse(body.to_string()),
        500..=599 => ProviderError::RequestFailed(format!("server error {status}: {body}")),
        _ => ProviderError::RequestFailed(format!("HTTP {status}: {body}")),
    }
}

/// Map a [`reqwest::Error`] to a [`ProviderError`].
pub(crate) fn map_reqwest_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout(Duration::from_secs(30))
    } else {
        ProviderError::RequestFailed(err.to_string())
    }
}
