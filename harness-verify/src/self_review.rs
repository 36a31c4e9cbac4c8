//! V1: self-review — the model reviews its own transcript.

use harness_context::Context;
use harness_types::{BoxFuture, CompletionRequest, Message, Task, VerificationResult};

use crate::transport::VerifierTransport;
use crate::verifier::Verifier;

/// Verbatim from `original_source/agent_verify/verification/self_review.py`.
const SELF_REVIEW_PROMPT: &str = "Review the changes you have made so far for the following task.

## Task
{task_description}

## Your Changes
Review all the file modifications and tool outputs in the conversation above.

## Instructions
1. Check if the changes correctly address the task requirements.
2. Look for potential bugs, edge cases, or missing functionality.
3. Determine if the task is truly complete.

Respond with EXACTLY one of:
- \"VERIFICATION_PASSED\" if the changes are correct and complete
- \"VERIFICATION_FAILED: <reason>\" if there are issues

Be critical and thorough in your review.";

/// Ask the model to review its own output in one extra transport call.
#[derive(Debug, Default)]
pub struct SelfReviewVerifier;

impl Verifier for SelfReviewVerifier {
    fn method_name(&self) -> &'static str {
        "self_review"
    }

    fn verify<'a>(
        &'a self,
        context: &'a Context,
        task: &'a Task,
        transport: Option<&'a dyn VerifierTransport>,
    ) -> BoxFuture<'a, VerificationResult> {
        Box::pin(async move {
            let Some(transport) = transport else {
                return VerificationResult::fail("Self-review requires an LLM client");
            };

            let prompt = SELF_REVIEW_PROMPT.replace("{task_description}", &task.description);
            let mut messages = context.messages.clone();
            messages.push(Message::user(prompt));

            let request = CompletionRequest {
                messages,
                system: None,
                tools: vec![],
                max_tokens: Some(2048),
                temperature: None,
            };

            match transport.complete(request).await {
                Ok(response) => {
                    let text = response.text();
                    let passed = text.contains("VERIFICATION_PASSED");
                    let token_cost = response.usage.input_tokens + response.usage.output_tokens;
                    let mut result = if passed {
                        VerificationResult::pass(text.clone())
                    } else {
                        VerificationResult::fail(text.clone())
                    };
                    result.token_cost = token_cost;
                    result.details.insert("raw_response".into(), serde_json::Value::String(text));
                    result
                }
                Err(e) => VerificationResult::fail(format!("self-review provider error: {e}")),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use harness_types::{CompletionResponse, ProviderError, StopReason, TokenUsage};
    use std::sync::Mutex;

    struct StubTransport {
        response: Mutex<Option<Result<CompletionResponse, ProviderError>>>,
    }

    impl VerifierTransport for StubTransport {
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
            content: vec![harness_types::ContentBlock::text(text)],
            stop_reason: StopReason::EndTurn,
            usage: TokenUsage {
                input_tokens: 100,
                output_tokens: 20,
                ..Default::default()
            },
            model: "claude-sonnet-4-6".into(),
        })
    }

    #[tokio::test]
    async fn fails_without_transport() {
        let context = Context::new();
        let task = Task::new("t1", "fix it");
        let result = SelfReviewVerifier.verify(&context, &task, None).await;
        assert!(!result.passed);
    }

    #[tokio::test]
    async fn passes_on_verification_passed_marker() {
        let transport = StubTransport {
            response: Mutex::new(Some(ok_response("Looks good. VERIFICATION_PASSED"))),
        };
        let context = Context::new();
        let task = Task::new("t1", "fix it");
        let result = SelfReviewVerifier.verify(&context, &task, Some(&transport)).await;
        assert!(result.passed);
        assert_eq!(result.token_cost, 120);
    }

    #[tokio::test]
    async fn fails_on_verification_failed_marker() {
        let transport = StubTransport {
            response: Mutex::new(Some(ok_response("VERIFICATION_FAILED: missing edge case"))),
        };
        let context = Context::new();
        let task = Task::new("t1", "fix it");
        let result = SelfReviewVerifier.verify(&context, &task, Some(&transport)).await;
        assert!(!result.passed);
        assert!(result.message.contains("missing edge case"));
    }
}
