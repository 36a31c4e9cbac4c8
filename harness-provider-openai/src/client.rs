//! OpenAI-compatible chat-completions client struct and builder.
//!
//! Targets vLLM, Ollama, and other local OpenAI-compatible servers (§4.C).

use harness_types::{CompletionRequest, CompletionResponse, PricingTable, Provider, ProviderError};

use crate::error::{map_http_status, map_reqwest_error};
use crate::mapping::{from_openai_response, to_openai_request};

/// Default base URL for a local vLLM/Ollama OpenAI-compatible server.
const DEFAULT_BASE_URL: &str = "http://localhost:8000/v1";

/// Client for an OpenAI-compatible chat-completions endpoint.
///
/// # Example
///
/// ```no_run
/// use harness_provider_openai::OpenAiCompat;
///
/// let client = OpenAiCompat::new("qwen3-32b")
///     .base_url("http://localhost:8000/v1")
///     .api_key("dummy");
/// ```
pub struct OpenAiCompat {
    model: String,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
    pricing: PricingTable,
}

impl OpenAiCompat {
    /// Create a new client targeting `model`, with the default local
    /// server base URL and a dummy API key (matching the teacher's
    /// local-server defaults — most vLLM/Ollama deployments don't check
    /// it).
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            base_url: DEFAULT_BASE_URL.into(),
            api_key: "dummy".into(),
            client: reqwest::Client::new(),
            pricing: PricingTable::default_table(),
        }
    }

    /// Override the base URL.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Override the API key.
    #[must_use]
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    /// Override the pricing table used for cost accounting.
    #[must_use]
    pub fn pricing(mut self, pricing: PricingTable) -> Self {
        self.pricing = pricing;
        self
    }

    fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

impl Provider for OpenAiCompat {
    /// Send a completion request to the configured OpenAI-compatible
    /// endpoint.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError> {
        let url = self.chat_completions_url();
        let tool_names: Vec<String> = request.tools.iter().map(|tool| tool.name.clone()).collect();
        let body = to_openai_request(&request, &self.model);

        tracing::debug!(url = %url, model = %self.model, "sending completion request");

        let response = self
            .client
            .post(&url)
            .header("authorization", format!("Bearer {}", self.api_key))
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

        from_openai_response(&json, &tool_names, &self.pricing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_set() {
        let client = OpenAiCompat::new("qwen3-32b");
        assert_eq!(client.model, "qwen3-32b");
        assert_eq!(client.base_url, DEFAULT_BASE_URL);
        assert_eq!(client.api_key, "dummy");
    }

    #[test]
    fn chat_completions_url_strips_trailing_slash() {
        let client = OpenAiCompat::new("qwen3-32b").base_url("http://localhost:9999/v1/");
        assert_eq!(client.chat_completions_url(), "http://localhost:9999/v1/chat/completions");
    }

    #[test]
    fn builder_overrides_api_key() {
        let client = OpenAiCompat::new("qwen3-32b").api_key("sk-local-test");
        assert_eq!(client.api_key, "sk-local-test");
    }
}
