//! Constructing a model transport from configuration (§4.C, §6).
//!
//! Both provider crates implement the same [`Provider`] seam; this is the
//! one place that branches on [`ProviderKind`] to pick a concrete client,
//! matching how `original_source/agent_verify/llm/__init__.py`'s factory
//! dispatches on a provider string.

use std::sync::Arc;

use harness_types::{DynProvider, LlmConfig, ProviderKind, RunnerError};

/// Build a boxed transport for `config`, resolving a missing `api_key`
/// from the provider's standard environment variable.
///
/// # Errors
/// [`RunnerError::Provision`] if an Anthropic transport is requested and
/// neither `config.api_key` nor `ANTHROPIC_API_KEY` is set.
pub fn build_transport(config: &LlmConfig) -> Result<Arc<dyn DynProvider>, RunnerError> {
    match config.provider {
        ProviderKind::Anthropic => {
            let api_key = config
                .api_key
                .clone()
                .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok())
                .ok_or_else(|| RunnerError::Provision("no Anthropic API key configured".to_string()))?;

            let mut client = harness_provider_anthropic::Anthropic::new(api_key).model(&config.model);
            if let Some(base_url) = &config.base_url {
                client = client.base_url(base_url.clone());
            }
            Ok(Arc::new(client))
        }
        ProviderKind::OpenaiCompatible | ProviderKind::Vllm | ProviderKind::Local => {
            let mut client = harness_provider_openai::OpenAiCompat::new(&config.model);
            if let Some(base_url) = &config.base_url {
                client = client.base_url(base_url.clone());
            }
            if let Some(api_key) = &config.api_key {
                client = client.api_key(api_key.clone());
            }
            Ok(Arc::new(client))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anthropic_without_api_key_or_env_errors() {
        std::env::remove_var("ANTHROPIC_API_KEY");
        let config = LlmConfig {
            provider: ProviderKind::Anthropic,
            api_key: None,
            ..LlmConfig::default()
        };
        assert!(build_transport(&config).is_err());
    }

    #[test]
    fn anthropic_with_explicit_api_key_succeeds() {
        let config = LlmConfig {
            provider: ProviderKind::Anthropic,
            api_key: Some("sk-ant-test".to_string()),
            ..LlmConfig::default()
        };
        assert!(build_transport(&config).is_ok());
    }

    #[test]
    fn openai_compatible_needs_no_api_key() {
        let config = LlmConfig {
            provider: ProviderKind::OpenaiCompatible,
            api_key: None,
            ..LlmConfig::default()
        };
        assert!(build_transport(&config).is_ok());
    }
}
