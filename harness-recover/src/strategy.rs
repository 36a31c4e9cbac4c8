//! The [`RecoveryStrategy`] trait (§4.E).

use harness_context::Context;
use harness_types::{BoxFuture, Task, VerificationResult};

use crate::outcome::RecoveryOutcome;

/// A recovery strategy, run after a verifier reports failure. Object-safe
/// so `create_recovery_strategy` can hand back a `Box<dyn RecoveryStrategy>`
/// selected at runtime from configuration.
pub trait RecoveryStrategy: Send + Sync {
    /// The strategy's name, as stamped onto event-log rows.
    fn strategy_name(&self) -> &'static str;

    /// Recover `context` from `verification`'s failure, in the context of
    /// `task`. Takes `context` by exclusive reference so R1 (and R2's
    /// no-transport fallback) can mutate it in place without the caller
    /// handing over ownership it can't get back.
    fn recover<'a>(
        &'a self,
        context: &'a mut Context,
        verification: &'a VerificationResult,
        task: &'a Task,
    ) -> BoxFuture<'a, RecoveryOutcome>;
}
