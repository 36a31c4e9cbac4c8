//! Anthropic API client struct and builder.

use harness_types::{CompletionRequest, CompletionResponse, PricingTable, Provider, ProviderError};

use crate::error::{map_http_status, map_reqwest_error};
use crate::mapping::{from_api_response, to_api_request};

/// Default model used when none is configured on the client.
const DEFAULT_MODEL: &str = "claude-sonnet-4-6";

/// Default Anthropic API base URL.
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// Anthropic API version header value.
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Client for the Anthropic Messages API.
///
/// Implements [`Provider`] for use anywhere a provider is accepted — the
/// native transport of §4.C, used when `ProviderKind::Anthropic` is
/// configured.
///
/// # Example
///
/// ```no_run
/// use harness_provider_anthropic::Anthropic;
///
/// let client = Anthropic::new("sk-ant-...")
///     .model("claude-opus-4-6")
///     .base_url("https://api.anthropic.com");
/// ```
pub struct Anthropic {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
    pricing: PricingTable,
}

impl Anthropic {
    /// Create a new client with the given API key and sensible defaults.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.into(),
            base_url: DEFAULT_BASE_URL.into(),
            client: reqwest::Client::new(),
            pricing: PricingTable::default_table(),
        }
    }

    /// Override the default model.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the API base URL. Useful for testing against a local mock
    /// server.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Override the pricing table used for cost accounting.
    #[must_use]
    pub fn pricing(mut self, pricing: PricingTable) -> Self {
        self.pricing = pricing;
        self
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.base_url)
    }
}

impl Provider for Anthropic {
    /// Send a completion request to the Anthropic Messages API.
    ///
    /// Maps the [`CompletionRequest`] to Anthropic's JSON format, sends it
    /// with the required headers, and maps the response back.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError> {
        let url = self.messages_url();
        let mut body = to_api_request(&request, &self.model);
        body["stream"] = serde_json::Value::Bool(false);

        tracing::debug!(url = %url, model = %body["model"], "sending completion request");

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        let response_text = response.text().await.map_err(map_reqwest_error)?;

        if !status.is_success() {
            return Err(map_http_status(status, &response_text));
        }

        let json: serde_json::Value = serde_json::from_str(&response_text)
            .map_err(|e| ProviderError::InvalidResponse(format!("invalid JSON response: {e}")))?;

        from_api_response(&json, &self.pricing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_model_and_base_url() {
        let client = Anthropic::new("test-key");
        assert_eq!(client.model, DEFAULT_MODEL);
        assert_eq!(client.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn builder_overrides_model_and_base_url() {
        let client = Anthropic::new("test-key")
            .model("claude-opus-4-6")
            .base_url("http://localhost:9999");
        assert_eq!(client.model, "claude-opus-4-6");
        assert_eq!(client.messages_url(), "http://localhost:9999/v1/messages");
    }

    #[test]
    fn api_key_is_stored() {
        let client = Anthropic::new("sk-ant-test");
        assert_eq!(client.api_key, "sk-ant-test");
    }
}
