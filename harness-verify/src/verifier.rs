//! The [`Verifier`] trait (§4.D).

use harness_context::Context;
use harness_types::{BoxFuture, Task, VerificationResult};

use crate::transport::VerifierTransport;

/// A verification strategy. Object-safe so `create_verifier` can hand back
/// a `Box<dyn Verifier>` selected at runtime from configuration.
///
/// `verify` never returns an error: every failure mode (missing command,
/// missing transport, subprocess failure) is folded into a failing
/// [`VerificationResult`], matching
/// `original_source/agent_verify/verification/*.py`'s broad
/// exception-to-result handling.
pub trait Verifier: Send + Sync {
    /// The verifier's name, as stamped onto event-log rows.
    fn method_name(&self) -> &'static str;

    /// Run this verification strategy against `context`/`task`.
    ///
    /// `transport` is `None` unless a model transport was configured —
    /// V0/V2/V4 ignore it; V1/V3 fail cleanly without one.
    fn verify<'a>(
        &'a self,
        context: &'a Context,
        task: &'a Task,
        transport: Option<&'a dyn VerifierTransport>,
    ) -> BoxFuture<'a, VerificationResult>;
}
