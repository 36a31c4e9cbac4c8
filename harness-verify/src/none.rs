//! V0: no verification — the agent's own `TASK_COMPLETE` declaration is
//! taken at face value.

use harness_context::Context;
use harness_types::{BoxFuture, Task, VerificationResult};

use crate::transport::VerifierTransport;
use crate::verifier::Verifier;

/// Always passes. Matches `original_source/agent_verify/verification/none.py`.
#[derive(Debug, Default)]
pub struct NoVerification;

impl Verifier for NoVerification {
    fn method_name(&self) -> &'static str {
        "none"
    }

    fn verify<'a>(
        &'a self,
        _context: &'a Context,
        _task: &'a Task,
        _transport: Option<&'a dyn VerifierTransport>,
    ) -> BoxFuture<'a, VerificationResult> {
        Box::pin(async move { VerificationResult::pass("No verification performed (V0 baseline)") })
    }
}
