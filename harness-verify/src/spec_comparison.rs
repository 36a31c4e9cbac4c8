//! V3: spec comparison — a separate model call compares the transcript
//! against the original task description.

use harness_context::Context;
use harness_types::{BoxFuture, CompletionRequest, Message, Task, VerificationResult};

use crate::transport::VerifierTransport;
use crate::verifier::Verifier;

/// Verbatim from `original_source/agent_verify/verification/spec_comparison.py`.
const SPEC_COMPARISON_PROMPT: &str = "You are a verification agent. Compare the work done in the conversation above against the original task specification below.

## Original Task Specification
{task_description}

## Instructions
1. Carefully compare every requirement in the spec against the actual changes made.
2. Check for completeness: are all requirements addressed?
3. Check for correctness: do the changes actually fulfill each requirement?
4. Check for regressions: could the changes break existing functionality?

Respond with EXACTLY one of:
- \"VERIFICATION_PASSED\" if all requirements are met
- \"VERIFICATION_FAILED: <specific list of unmet requirements or issues>\"

Be strict and thorough. Only pass if ALL requirements are clearly met.";

/// Compare the transcript against the task spec in one extra transport call.
#[derive(Debug, Default)]
pub struct SpecComparisonVerifier;

impl Verifier for SpecComparisonVerifier {
    fn method_name(&self) -> &'static str {
        "spec_comparison"
    }

    fn verify<'a>(
        &'a self,
        context: &'a Context,
        task: &'a Task,
        transport: Option<&'a dyn VerifierTransport>,
    ) -> BoxFuture<'a, VerificationResult> {
        Box::pin(async move {
            let Some(transport) = transport else {
                return VerificationResult::fail("Spec comparison requires an LLM client");
            };

            let prompt = SPEC_COMPARISON_PROMPT.replace("{task_description}", &task.description);
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
                Err(e) => VerificationResult::fail(format!("spec comparison provider error: {e}")),
            }
        })
    }
}
