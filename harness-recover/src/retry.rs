//! R1: retry in context — append failure feedback and continue.

use harness_context::Context;
use harness_types::{BoxFuture, Task, VerificationResult};

use crate::outcome::RecoveryOutcome;
use crate::strategy::RecoveryStrategy;

/// Builds the exact feedback message R1 appends, verbatim from
/// `original_source/agent_verify/recovery/retry.py` — also reused by R2's
/// no-transport fallback.
pub(crate) fn feedback_message(verification_message: &str) -> String {
    format!("VERIFICATION FAILED. Please fix the issues and try again.\n\nFailure details:\n{verification_message}")
}

/// R1: append failure feedback to the current context and retry.
#[derive(Debug, Default)]
pub struct RetryInContext;

impl RecoveryStrategy for RetryInContext {
    fn strategy_name(&self) -> &'static str {
        "retry_in_context"
    }

    fn recover<'a>(
        &'a self,
        context: &'a mut Context,
        verification: &'a VerificationResult,
        _task: &'a Task,
    ) -> BoxFuture<'a, RecoveryOutcome> {
        Box::pin(async move {
            context.add_user_message(feedback_message(&verification.message));
            context.recovery_count += 1;
            context.clear_terminal();
            RecoveryOutcome::Mutated
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use harness_types::TerminalReason;

    #[tokio::test]
    async fn appends_feedback_and_clears_terminal() {
        let mut context = Context::new();
        context.mark_terminal(TerminalReason::AgentDeclared);
        let verification = VerificationResult::fail("missing edge case");
        let task = Task::new("t1", "fix it");

        let outcome = RetryInContext.recover(&mut context, &verification, &task).await;

        assert!(matches!(outcome, RecoveryOutcome::Mutated));
        assert!(!context.terminal);
        assert_eq!(context.recovery_count, 1);
        let last = context.messages.last().expect("feedback appended");
        assert!(last.text().contains("missing edge case"));
        assert!(last.text().contains("VERIFICATION FAILED"));
    }
}
