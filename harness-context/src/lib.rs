//! The per-run conversation [`Context`] (§3 Context, §4.A).
//!
//! A value-like object owned by exactly one scheduler invocation — never
//! shared across tasks or worker threads. Field/method shapes are grounded
//! on `original_source/agent_verify/context.py`'s `Context` dataclass.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use harness_types::{ContentBlock, Message, Role, TaskResult, TerminalReason, TokenUsage};

/// One audit-trail entry for a dispatched tool call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallRecord {
    /// Tool name.
    pub name: String,
    /// Tool arguments as JSON.
    pub arguments: serde_json::Value,
    /// Stringified tool result (already truncated to 5000 chars — the
    /// audit-trail copy, distinct from the full result sent to the model).
    pub result: String,
    /// When the call happened.
    pub timestamp: DateTime<Utc>,
    /// Call duration, in milliseconds.
    pub duration_ms: u64,
}

/// A compact snapshot of a context's state, suitable for the `run_end`
/// event and summary-document rows (`get_summary` in the Python source).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextSummary {
    /// Iterations run.
    pub iterations: u64,
    /// Verifications run.
    pub verifications: u64,
    /// Recoveries run.
    pub recoveries: u64,
    /// Whether the run is in a terminal state.
    pub resolved: bool,
    /// The terminal reason, if terminal.
    pub terminal_reason: Option<TerminalReason>,
    /// Cumulative usage.
    pub usage: TokenUsage,
}

/// The fixed window tool results are truncated to before being appended to
/// the audit trail (§4.B) — the model itself always receives the full
/// string; only `ToolCallRecord::result` is clipped.
pub const TOOL_RESULT_AUDIT_TRUNCATION: usize = 5000;

/// A single scheduler run's conversation, accounting, and terminal state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Context {
    /// Ordered conversation messages (user/assistant alternating at the
    /// role level; tool results appear as user-role messages).
    pub messages: Vec<Message>,
    /// Audit trail of every dispatched tool call, parallel in time to the
    /// tool-result messages in `messages` but not identical in shape.
    pub tool_calls: Vec<ToolCallRecord>,
    /// Cumulative usage across this context's lifetime.
    pub usage: TokenUsage,
    /// When this context was created.
    pub start_time: DateTime<Utc>,
    /// Number of model-generation iterations run.
    pub iteration_count: u64,
    /// Number of verifier invocations run.
    pub verification_count: u64,
    /// Number of recovery invocations run.
    pub recovery_count: u64,
    /// Whether the scheduler considers this context finished.
    ///
    /// Note: R1 deliberately clears this flag to resume the outer loop
    /// after appending feedback (§4.E) — the "transitions once and never
    /// back" invariant in §3 describes the context's *final* resting
    /// state once the scheduler actually returns a [`TaskResult`], not
    /// every intermediate flip during in-place recovery.
    pub terminal: bool,
    /// Why the context became terminal, if it is.
    pub terminal_reason: Option<TerminalReason>,
}

impl Context {
    /// Start a brand-new, empty context.
    #[must_use]
    pub fn new() -> Self {
        Context {
            messages: Vec::new(),
            tool_calls: Vec::new(),
            usage: TokenUsage::default(),
            start_time: Utc::now(),
            iteration_count: 0,
            verification_count: 0,
            recovery_count: 0,
            terminal: false,
            terminal_reason: None,
        }
    }

    /// Append a user-role text message.
    pub fn add_user_message(&mut self, text: impl Into<String>) {
        self.messages.push(Message::user(text));
    }

    /// Append an assistant-role message carrying a full content-block list.
    pub fn add_assistant_message(&mut self, content: Vec<ContentBlock>) {
        self.messages.push(Message::assistant(content));
    }

    /// Append a tool result, wrapped as a single tool_result block inside
    /// a user-role message (§4.A).
    pub fn add_tool_result_message(&mut self, tool_use_id: impl Into<String>, content: impl Into<String>, is_error: bool) {
        self.messages.push(Message::tool_result(tool_use_id, content, is_error));
    }

    /// Record a tool-call audit entry, truncating the stored result to
    /// [`TOOL_RESULT_AUDIT_TRUNCATION`] chars.
    pub fn record_tool_call(
        &mut self,
        name: impl Into<String>,
        arguments: serde_json::Value,
        full_result: &str,
        duration_ms: u64,
    ) {
        let result = if full_result.chars().count() > TOOL_RESULT_AUDIT_TRUNCATION {
            let mut truncated: String = full_result.chars().take(TOOL_RESULT_AUDIT_TRUNCATION).collect();
            truncated.push_str(&format!("... [truncated, {} chars total]", full_result.chars().count()));
            truncated
        } else {
            full_result.to_string()
        };
        self.tool_calls.push(ToolCallRecord {
            name: name.into(),
            arguments,
            result,
            timestamp: Utc::now(),
            duration_ms,
        });
    }

    /// Add a usage delta to the cumulative total. Accepts all five
    /// counter deltas via [`TokenUsage`].
    pub fn add_usage(&mut self, delta: &TokenUsage) {
        self.usage.accumulate(delta);
    }

    /// Mark this context terminal with the given reason.
    pub fn mark_terminal(&mut self, reason: TerminalReason) {
        self.terminal = true;
        self.terminal_reason = Some(reason);
    }

    /// Clear the terminal flag to resume the loop — used by R1.
    pub fn clear_terminal(&mut self) {
        self.terminal = false;
        self.terminal_reason = None;
    }

    /// Seconds elapsed since `start_time`.
    #[must_use]
    pub fn elapsed_seconds(&self) -> f64 {
        (Utc::now() - self.start_time).num_milliseconds() as f64 / 1000.0
    }

    /// A fresh message history carrying every cumulative counter forward —
    /// used by recovery strategies R2/R3, which start a new conversation
    /// window but still report one run's total cost/tool-call/iteration
    /// count in the final `TaskResult`. `recovery_count` is bumped by one
    /// here since this method itself represents a recovery.
    #[must_use]
    pub fn clone_fresh(&self) -> Self {
        Context {
            messages: Vec::new(),
            tool_calls: self.tool_calls.clone(),
            usage: self.usage,
            start_time: self.start_time,
            iteration_count: self.iteration_count,
            verification_count: self.verification_count,
            recovery_count: self.recovery_count + 1,
            terminal: false,
            terminal_reason: None,
        }
    }

    /// A compact summary of this context's state.
    #[must_use]
    pub fn get_summary(&self) -> ContextSummary {
        ContextSummary {
            iterations: self.iteration_count,
            verifications: self.verification_count,
            recoveries: self.recovery_count,
            resolved: self.terminal_reason == Some(TerminalReason::Verified),
            terminal_reason: self.terminal_reason,
            usage: self.usage,
        }
    }

    /// Build a [`TaskResult`] from this context's final state.
    #[must_use]
    pub fn into_result(self, task_id: impl Into<String>) -> TaskResult {
        let reason = self.terminal_reason.unwrap_or(TerminalReason::HarnessError);
        let mut result = TaskResult::new(task_id, reason, self.usage);
        result.wall_clock_seconds = self.elapsed_seconds();
        result.tool_call_count = self.tool_calls.len() as u64;
        result.verification_count = self.verification_count;
        result.recovery_count = self.recovery_count;
        result.iteration_count = self.iteration_count;
        result
    }

    /// All `tool_use` ids that appear in the most recent assistant message,
    /// used to validate that a tool_result references a real prior call
    /// (§8's tool_use-id invariant).
    #[must_use]
    pub fn last_assistant_tool_use_ids(&self) -> Vec<String> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::Assistant)
            .map(|m| m.tool_uses().into_iter().map(|(id, _, _)| id.to_string()).collect())
            .unwrap_or_default()
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use harness_types::ContentBlock;
    use serde_json::json;

    #[test]
    fn add_user_then_assistant_alternates_roles() {
        let mut ctx = Context::new();
        ctx.add_user_message("fix the bug");
        ctx.add_assistant_message(vec![ContentBlock::text("working on it")]);
        assert_eq!(ctx.messages[0].role, Role::User);
        assert_eq!(ctx.messages[1].role, Role::Assistant);
    }

    #[test]
    fn usage_accumulates_monotonically() {
        let mut ctx = Context::new();
        ctx.add_usage(&TokenUsage {
            input_tokens: 10,
            output_tokens: 5,
            ..Default::default()
        });
        ctx.add_usage(&TokenUsage {
            input_tokens: 3,
            output_tokens: 2,
            ..Default::default()
        });
        assert_eq!(ctx.usage.input_tokens, 13);
        assert_eq!(ctx.usage.output_tokens, 7);
    }

    #[test]
    fn record_tool_call_truncates_audit_copy() {
        let mut ctx = Context::new();
        let long_output = "x".repeat(6000);
        ctx.record_tool_call("bash", json!({"command": "echo"}), &long_output, 10);
        assert!(ctx.tool_calls[0].result.len() < 6000);
        assert!(ctx.tool_calls[0].result.contains("truncated"));
    }

    #[test]
    fn clone_fresh_carries_cumulative_counters_forward() {
        let mut ctx = Context::new();
        ctx.add_user_message("hi");
        ctx.add_usage(&TokenUsage {
            input_tokens: 100,
            ..Default::default()
        });
        ctx.iteration_count = 5;
        ctx.verification_count = 2;

        let fresh = ctx.clone_fresh();
        assert_eq!(fresh.start_time, ctx.start_time);
        assert!(fresh.messages.is_empty());
        assert_eq!(fresh.usage.input_tokens, 100);
        assert_eq!(fresh.iteration_count, 5);
        assert_eq!(fresh.verification_count, 2);
        assert_eq!(fresh.recovery_count, ctx.recovery_count + 1);
    }

    #[test]
    fn mark_and_clear_terminal() {
        let mut ctx = Context::new();
        assert!(!ctx.terminal);
        ctx.mark_terminal(TerminalReason::AgentDeclared);
        assert!(ctx.terminal);
        ctx.clear_terminal();
        assert!(!ctx.terminal);
        assert!(ctx.terminal_reason.is_none());
    }

    #[test]
    fn into_result_matches_terminal_reason() {
        let mut ctx = Context::new();
        ctx.mark_terminal(TerminalReason::Verified);
        ctx.iteration_count = 3;
        let result = ctx.into_result("task-1");
        assert!(result.resolved);
        assert_eq!(result.iteration_count, 3);
    }

    #[test]
    fn last_assistant_tool_use_ids_finds_most_recent() {
        let mut ctx = Context::new();
        ctx.add_user_message("hi");
        ctx.add_assistant_message(vec![ContentBlock::ToolUse {
            id: "tu_1".into(),
            name: "bash".into(),
            input: json!({}),
        }]);
        assert_eq!(ctx.last_assistant_tool_use_ids(), vec!["tu_1".to_string()]);
    }
}
