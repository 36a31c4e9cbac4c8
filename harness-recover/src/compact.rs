//! R2: compact-and-retry — summarize the context via the model, then
//! continue in a fresh context seeded with the summary.

use harness_context::Context;
use harness_types::{BoxFuture, CompletionRequest, Message, Task, VerificationResult};

use crate::outcome::RecoveryOutcome;
use crate::retry::feedback_message;
use crate::strategy::RecoveryStrategy;
use crate::transport::RecoveryTransport;

/// Verbatim from `original_source/agent_verify/recovery/compact.py`.
const COMPACTION_PROMPT: &str = "Summarize the conversation so far into a concise technical summary.
Include:
1. What task was being worked on
2. What approaches were tried
3. What files were modified and how
4. The current state of the changes
5. What verification failed and why

Keep it under 2000 tokens. Be precise and technical.";

/// R2: summarize via one extra transport call, then hand the scheduler a
/// fresh context seeded with the summary and the failure message.
///
/// Degrades to [`crate::RetryInContext`] behavior when no transport is
/// configured, per §4.E and the spec's cross-family injection note — the
/// transport is injected at construction, not per call, matching the
/// scheduler owning one instance of each strategy per task.
pub struct CompactAndRetry {
    transport: Option<Box<dyn RecoveryTransport>>,
}

impl CompactAndRetry {
    /// Build a strategy with no transport configured — calls to `recover`
    /// will degrade to R1 behavior until [`Self::with_transport`] is used.
    #[must_use]
    pub fn new() -> Self {
        CompactAndRetry { transport: None }
    }

    /// Build a strategy that issues its compaction call through `transport`.
    #[must_use]
    pub fn with_transport(transport: Box<dyn RecoveryTransport>) -> Self {
        CompactAndRetry { transport: Some(transport) }
    }
}

impl Default for CompactAndRetry {
    fn default() -> Self {
        Self::new()
    }
}

impl RecoveryStrategy for CompactAndRetry {
    fn strategy_name(&self) -> &'static str {
        "compact_and_retry"
    }

    fn recover<'a>(
        &'a self,
        context: &'a mut Context,
        verification: &'a VerificationResult,
        task: &'a Task,
    ) -> BoxFuture<'a, RecoveryOutcome> {
        Box::pin(async move {
            let Some(transport) = &self.transport else {
                context.add_user_message(feedback_message(&verification.message));
                context.recovery_count += 1;
                context.clear_terminal();
                return RecoveryOutcome::Mutated;
            };

            let mut summary_messages = context.messages.clone();
            summary_messages.push(Message::user(COMPACTION_PROMPT));

            let request = CompletionRequest {
                messages: summary_messages,
                system: None,
                tools: vec![],
                max_tokens: Some(2048),
                temperature: None,
            };

            let summary = match transport.complete(request).await {
                Ok(response) => {
                    context.add_usage(&response.usage);
                    response.text()
                }
                Err(e) => format!("(compaction summary unavailable: {e})"),
            };

            let mut fresh = context.clone_fresh();
            let compacted_content = format!(
                "## Context Summary (from previous attempt)\n{summary}\n\n\
                 ## Verification Failure\n{}\n\n\
                 ## Task\n{}\n\n\
                 Please continue working on this task, addressing the verification failure above.",
                verification.message, task.description
            );
            fresh.add_user_message(compacted_content);
            RecoveryOutcome::Replaced(fresh)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use harness_types::{CompletionResponse, ContentBlock, ProviderError, StopReason, TokenUsage};
    use std::sync::Mutex;

    struct StubTransport {
        response: Mutex<Option<Result<CompletionResponse, ProviderError>>>,
    }

    impl RecoveryTransport for StubTransport {
        fn complete(
            &self,
            _request: CompletionRequest,
        ) -> harness_types::BoxFuture<'_, Result<CompletionResponse, ProviderError>> {
            let response = self.response.lock().unwrap().take().expect("single-use stub");
            Box::pin(async move { response })
        }
    }

    fn ok_response(text: &str) -> Result<CompletionResponse, ProviderError> {
        Ok(CompletionResponse {
            content: vec![ContentBlock::text(text)],
            stop_reason: StopReason::EndTurn,
            usage: TokenUsage {
                input_tokens: 50,
                output_tokens: 30,
                ..Default::default()
            },
            model: "claude-sonnet-4-6".into(),
        })
    }

    #[tokio::test]
    async fn degrades_to_r1_without_transport() {
        let mut context = Context::new();
        context.iteration_count = 2;
        let verification = VerificationResult::fail("tests still fail");
        let task = Task::new("t1", "fix it");

        let outcome = CompactAndRetry::new().recover(&mut context, &verification, &task).await;

        assert!(matches!(outcome, RecoveryOutcome::Mutated));
        assert_eq!(context.recovery_count, 1);
        assert!(!context.terminal);
    }

    #[tokio::test]
    async fn replaces_context_with_summary_when_transport_present() {
        let transport = StubTransport {
            response: Mutex::new(Some(ok_response("Fixed the parser, tests still failing on edge case X."))),
        };
        let mut context = Context::new();
        context.add_user_message("original task message");
        context.iteration_count = 3;
        context.verification_count = 1;
        let verification = VerificationResult::fail("edge case X still broken");
        let task = Task::new("t1", "fix the parser");

        let outcome = CompactAndRetry::with_transport(Box::new(transport))
            .recover(&mut context, &verification, &task)
            .await;

        match outcome {
            RecoveryOutcome::Replaced(fresh) => {
                assert_eq!(fresh.recovery_count, 1);
                assert_eq!(fresh.iteration_count, 3);
                assert_eq!(fresh.verification_count, 1);
                assert_eq!(fresh.messages.len(), 1);
                let text = fresh.messages[0].text();
                assert!(text.contains("Fixed the parser"));
                assert!(text.contains("edge case X still broken"));
                assert!(text.contains("fix the parser"));
            }
            RecoveryOutcome::Mutated => panic!("expected a replaced context"),
        }
        assert_eq!(context.usage.input_tokens, 50);
        assert_eq!(context.usage.output_tokens, 30);
    }
}
