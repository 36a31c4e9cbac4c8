//! The [`Scheduler`]: generate, dispatch tools, verify, recover, repeat.
//!
//! Grounded on `original_source/agent_verify/harness.py`'s `AgentHarness`,
//! `_agent_loop`, `_execute_tool`, and `_run_verification`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use harness_context::Context;
use harness_log::ExperimentLogger;
use harness_recover::RecoveryOutcome;
use harness_tool::ToolRegistry;
use harness_types::{
    BoxFuture, CompletionRequest, DynProvider, HarnessConfig, SchedulerError, StopReason, Task, TaskResult,
    TokenUsage, VerificationGranularity,
};

use crate::provider_adapter::SharedProvider;

/// The literal marker the agent includes in its response text to declare
/// the task finished, matching `agent_verify.harness.TASK_COMPLETE_MARKER`.
pub const TASK_COMPLETE_MARKER: &str = "TASK_COMPLETE";

/// Runs one task through the generate/dispatch/verify/recover loop.
///
/// Owns exactly the pieces `original_source/agent_verify/harness.py`'s
/// `AgentHarness.__init__` assembles: a toolset, a verifier, a recovery
/// strategy, a model transport, and an optional event logger. A fresh
/// `Scheduler` is built per experiment, not per task — [`Scheduler::run`]
/// is safe to call repeatedly and concurrently, since each call owns its
/// own [`Context`].
pub struct Scheduler {
    config: HarnessConfig,
    tools: ToolRegistry,
    verifier: Box<dyn harness_verify::Verifier>,
    recovery: Box<dyn harness_recover::RecoveryStrategy>,
    transport: Arc<dyn DynProvider>,
    logger: Option<Arc<ExperimentLogger>>,
}

impl Scheduler {
    /// Assemble a scheduler from configuration, a model transport, and an
    /// optional event logger.
    #[must_use]
    pub fn new(config: HarnessConfig, transport: Arc<dyn DynProvider>, logger: Option<Arc<ExperimentLogger>>) -> Self {
        let tools = harness_tool::create_default_toolset(&config.workspace_dir);
        let subprocess_timeout = Duration::from_secs(config.timeout_seconds);
        let verifier = harness_verify::create_verifier(config.verification_method, subprocess_timeout);
        let recovery = harness_recover::create_recovery_strategy(
            config.recovery_strategy,
            Some(Box::new(SharedProvider(transport.clone()))),
        );
        Scheduler {
            config,
            tools,
            verifier,
            recovery,
            transport,
            logger,
        }
    }

    /// Run the agent on `task`, returning its final result.
    ///
    /// Never panics on a transport/tool/context failure: any
    /// [`SchedulerError`] surfaced from the loop is folded into a
    /// `TerminalReason::HarnessError` result rather than propagated,
    /// matching `AgentHarness.run`'s broad `except Exception` wrapping.
    pub async fn run(&self, task: Task) -> TaskResult {
        if let Some(logger) = &self.logger {
            logger.log_run_start(task.task_id.clone()).await;
        }

        let mut context = Context::new();
        context.add_user_message(task.description.clone());

        let result = match self.agent_loop(&mut context, &task, 0).await {
            Ok(()) => context.into_result(task.task_id.clone()),
            Err(e) => {
                let mut result = TaskResult::new(task.task_id.clone(), harness_types::TerminalReason::HarnessError, context.usage);
                result.wall_clock_seconds = context.elapsed_seconds();
                result.tool_call_count = context.tool_calls.len() as u64;
                result.verification_count = context.verification_count;
                result.recovery_count = context.recovery_count;
                result.iteration_count = context.iteration_count;
                result.error = Some(e.to_string());
                result
            }
        };

        if let Some(logger) = &self.logger {
            logger.log_run_end(result.clone()).await;
        }

        result
    }

    /// The recursive generate/dispatch/verify/recover state machine (§4.F).
    /// Boxed because async fns cannot recurse directly.
    fn agent_loop<'a>(
        &'a self,
        context: &'a mut Context,
        task: &'a Task,
        recovery_attempts: u64,
    ) -> BoxFuture<'a, Result<(), SchedulerError>> {
        Box::pin(async move {
            let mut recovery_attempts = recovery_attempts;
            while !context.terminal {
                if context.iteration_count >= self.config.max_iterations {
                    context.mark_terminal(harness_types::TerminalReason::MaxIterations);
                    break;
                }
                if total_tokens(&context.usage) >= self.config.max_tokens_budget {
                    context.mark_terminal(harness_types::TerminalReason::TokenBudget);
                    break;
                }
                if context.elapsed_seconds() >= self.config.timeout_seconds as f64 {
                    context.mark_terminal(harness_types::TerminalReason::Timeout);
                    break;
                }

                let request = CompletionRequest {
                    messages: context.messages.clone(),
                    system: Some(self.config.system_prompt.clone()),
                    tools: self.tools.definitions(),
                    max_tokens: Some(self.config.llm.max_tokens),
                    temperature: Some(self.config.llm.temperature),
                };
                let response = self.transport.complete(request).await?;

                context.add_usage(&response.usage);
                context.iteration_count += 1;

                if let Some(logger) = &self.logger {
                    logger
                        .log_llm_call(
                            task.task_id.clone(),
                            context.iteration_count,
                            response.model.clone(),
                            response.usage.input_tokens,
                            response.usage.output_tokens,
                            response.usage.cache_creation_tokens,
                            response.usage.cache_read_tokens,
                            decimal_to_f64(response.usage.cost_usd),
                        )
                        .await;
                }

                let tool_uses: Vec<(String, String, serde_json::Value)> = response
                    .tool_uses()
                    .into_iter()
                    .map(|(id, name, input)| (id.to_string(), name.to_string(), input.clone()))
                    .collect();
                let declared_complete = response.text().contains(TASK_COMPLETE_MARKER);
                let stop_reason = response.stop_reason;
                context.add_assistant_message(response.content);

                if !tool_uses.is_empty() {
                    for (tool_use_id, name, input) in tool_uses {
                        let result = self.execute_tool(&name, input.clone(), task, context).await;
                        let is_error = result.starts_with("Error");
                        context.add_tool_result_message(tool_use_id, result, is_error);

                        if self.config.verification_granularity == VerificationGranularity::PerStep {
                            let should_continue =
                                self.run_verification(context, task, &mut recovery_attempts).await?;
                            if !should_continue {
                                return Ok(());
                            }
                        }
                    }
                } else if declared_complete {
                    context.mark_terminal(harness_types::TerminalReason::AgentDeclared);
                    let should_continue = self.run_verification(context, task, &mut recovery_attempts).await?;
                    if !should_continue {
                        return Ok(());
                    }
                } else if stop_reason == StopReason::EndTurn {
                    context.add_user_message(
                        "Please continue working on the task. When done, include 'TASK_COMPLETE' in your response.",
                    );
                }
            }

            Ok(())
        })
    }

    /// Execute one tool call, recording it on the audit trail and the event
    /// log. Never propagates a tool error to the caller — it is folded into
    /// the stringified result the model sees, matching
    /// `_execute_tool`'s broad `except Exception`.
    async fn execute_tool(&self, name: &str, input: serde_json::Value, task: &Task, context: &mut Context) -> String {
        let start = Instant::now();
        let result = match self.tools.execute(name, input.clone()).await {
            Ok(result) => result,
            Err(e) => format!("Error: {e}"),
        };
        let duration_ms = start.elapsed().as_millis() as u64;
        context.record_tool_call(name, input.clone(), &result, duration_ms);

        if let Some(logger) = &self.logger {
            logger
                .log_tool_call(task.task_id.clone(), context.iteration_count, name, input, duration_ms, &result)
                .await;
        }

        result
    }

    /// Run the configured verifier, folding its token cost into the
    /// context's cumulative usage exactly once, then either accept the
    /// result, attempt recovery, or exhaust the recovery budget.
    ///
    /// Returns `Ok(true)` when the loop should keep iterating (R1 amended
    /// the context in place), `Ok(false)` when the context has reached a
    /// terminal state and the caller should stop.
    ///
    /// `recovery_attempts` tracks how many recoveries this loop invocation
    /// (and any it recursed from) has actually performed, and is
    /// incremented here on every recovery regardless of whether it mutated
    /// the context in place or replaced it — a deliberate generalization of
    /// `_run_verification`'s Python original, whose local parameter only
    /// advances across fresh-context recursions and would otherwise let an
    /// in-place strategy retry forever without ever hitting the budget.
    fn run_verification<'a>(
        &'a self,
        context: &'a mut Context,
        task: &'a Task,
        recovery_attempts: &'a mut u64,
    ) -> BoxFuture<'a, Result<bool, SchedulerError>> {
        Box::pin(async move {
            let verification = self.verifier.verify(context, task, Some(self.transport.as_ref())).await;
            context.verification_count += 1;

            if verification.token_cost > 0 {
                context.add_usage(&TokenUsage {
                    output_tokens: verification.token_cost,
                    ..Default::default()
                });
            }

            if let Some(logger) = &self.logger {
                logger.log_verification(task.task_id.clone(), self.verifier.method_name(), &verification).await;
            }

            if verification.passed {
                context.mark_terminal(harness_types::TerminalReason::Verified);
                return Ok(false);
            }

            if *recovery_attempts >= self.config.max_recovery_attempts {
                context.mark_terminal(harness_types::TerminalReason::MaxRecovery);
                return Ok(false);
            }

            if let Some(logger) = &self.logger {
                logger
                    .log_recovery(
                        task.task_id.clone(),
                        self.recovery.strategy_name(),
                        *recovery_attempts + 1,
                        verification.message.clone(),
                    )
                    .await;
            }

            let outcome = self.recovery.recover(context, &verification, task).await;
            *recovery_attempts += 1;

            match outcome {
                RecoveryOutcome::Mutated => Ok(true),
                RecoveryOutcome::Replaced(mut new_context) => {
                    self.agent_loop(&mut new_context, task, *recovery_attempts).await?;
                    context.terminal = true;
                    context.terminal_reason = new_context.terminal_reason;
                    context.usage = new_context.usage;
                    context.verification_count = new_context.verification_count;
                    context.recovery_count = new_context.recovery_count;
                    context.iteration_count = new_context.iteration_count;
                    context.tool_calls = new_context.tool_calls;
                    Ok(false)
                }
            }
        })
    }

}

/// The budget-check total: plain + cached input tokens, plus output
/// tokens. Distinct from `TokenUsage::total_input`, which excludes output.
fn total_tokens(usage: &TokenUsage) -> u64 {
    usage.total_input() + usage.output_tokens
}

fn decimal_to_f64(value: rust_decimal::Decimal) -> f64 {
    value.to_string().parse().unwrap_or(0.0)
}
