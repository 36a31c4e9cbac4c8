//! The two seam traits the rest of the harness is built around.
//!
//! [`Provider`] uses RPITIT and is intentionally NOT object-safe — each
//! concrete transport is selected at the top of a scheduler's generic
//! parameter, following `neuron-turn::provider::Provider`. [`ToolDyn`] is
//! object-safe on purpose: the active toolset is assembled per task from a
//! workspace path, so it is stored as `Arc<dyn ToolDyn>` in a registry,
//! following `neuron-tool::ToolDyn`.

use std::future::Future;
use std::pin::Pin;

use crate::error::{ProviderError, ToolError};
use crate::request::{CompletionRequest, CompletionResponse};

/// A model transport backend (native Anthropic, OpenAI-compatible, ...).
pub trait Provider: Send + Sync {
    /// Send one completion request and await the response.
    fn complete(
        &self,
        request: CompletionRequest,
    ) -> impl Future<Output = Result<CompletionResponse, ProviderError>> + Send;
}

/// A boxed future, for the object-safe traits below.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Object-safe wrapper over [`Provider`], for call sites that need to hold
/// a model transport behind a trait object — verifier and recovery
/// strategies selected at runtime from configuration, following
/// `ToolDyn`'s own object-safety rationale one level up.
pub trait DynProvider: Send + Sync {
    /// Send one completion request and await the response.
    fn complete(&self, request: CompletionRequest) -> BoxFuture<'_, Result<CompletionResponse, ProviderError>>;
}

impl<P: Provider> DynProvider for P {
    fn complete(&self, request: CompletionRequest) -> BoxFuture<'_, Result<CompletionResponse, ProviderError>> {
        Box::pin(async move { Provider::complete(self, request).await })
    }
}

/// A single workspace tool (file_read, file_write, file_edit, bash).
///
/// Object-safe: the registry stores these behind `Arc<dyn ToolDyn>`.
pub trait ToolDyn: Send + Sync {
    /// The tool's name, as referenced by `ContentBlock::ToolUse::name`.
    fn name(&self) -> &str;

    /// A human-readable description shown to the model.
    fn description(&self) -> &str;

    /// JSON Schema describing the tool's arguments.
    fn input_schema(&self) -> serde_json::Value;

    /// Execute the tool with the given structured arguments, returning the
    /// stringified result the spec mandates for all tool outputs.
    fn call(&self, input: serde_json::Value) -> BoxFuture<'_, Result<String, ToolError>>;
}
