//! Adapter letting one shared model transport back both the verifier's and
//! the recovery strategy's transport handle.
//!
//! `harness-verify::create_verifier` borrows a `&dyn DynProvider` per call,
//! but `harness-recover::create_recovery_strategy` takes ownership of a
//! `Box<dyn DynProvider>` once, at construction. The scheduler has exactly
//! one underlying transport per run, so this wraps an `Arc` clone of it in
//! a thin box the recovery strategy can own independently.

use std::sync::Arc;

use harness_types::{BoxFuture, CompletionRequest, CompletionResponse, DynProvider, ProviderError};

/// A boxable handle onto a shared `Arc<dyn DynProvider>`.
pub struct SharedProvider(pub Arc<dyn DynProvider>);

impl DynProvider for SharedProvider {
    fn complete(&self, request: CompletionRequest) -> BoxFuture<'_, Result<CompletionResponse, ProviderError>> {
        self.0.complete(request)
    }
}
