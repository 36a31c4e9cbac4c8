//! Benchmark task and scheduler result types (§3 Task, §3 Result).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::request::TokenUsage;

/// An immutable benchmark task handed to one scheduler invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique task identifier (e.g. a SWE-bench `instance_id`).
    pub task_id: String,
    /// Natural-language problem description shown to the agent.
    pub description: String,
    /// Origin repository, `owner/name` shape.
    #[serde(default)]
    pub repo: String,
    /// Base revision the workspace is checked out to.
    #[serde(default)]
    pub base_commit: String,
    /// Shell command that runs the task's test suite; empty means V2/V4
    /// cannot run and must fail with "no command configured".
    #[serde(default)]
    pub test_command: String,
    /// Shell command for V4's end-to-end check, if any.
    #[serde(default)]
    pub e2e_command: Option<String>,
    /// Workspace directory, filled in during provisioning (§4.G). `None`
    /// before the batch runner provisions it.
    #[serde(default)]
    pub workspace_dir: Option<PathBuf>,
    /// Free-form benchmark-specific fields: `patch` (gold reference,
    /// never shown to the agent), `test_patch`, `FAIL_TO_PASS`, `version`,
    /// `setup_commit`, hint text.
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Task {
    /// Construct a minimal task with only an id and description — used
    /// pervasively in tests.
    #[must_use]
    pub fn new(task_id: impl Into<String>, description: impl Into<String>) -> Self {
        Task {
            task_id: task_id.into(),
            description: description.into(),
            repo: String::new(),
            base_commit: String::new(),
            test_command: String::new(),
            e2e_command: None,
            workspace_dir: None,
            metadata: HashMap::new(),
        }
    }

    /// The workspace directory, or the current directory if unprovisioned
    /// (callers that need a hard requirement should check `workspace_dir`
    /// directly instead).
    #[must_use]
    pub fn workspace_dir_or_default(&self) -> PathBuf {
        self.workspace_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

/// The closed set of terminal-reason tags a scheduler run can end with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalReason {
    /// The verifier returned `passed = true`.
    Verified,
    /// The agent emitted `TASK_COMPLETE` and the verifier was run but
    /// this value is only used transiently before being replaced by
    /// `Verified` or a recovery-path reason — kept for completeness of
    /// the closed set named in §3.
    AgentDeclared,
    /// Iteration-count budget exhausted.
    MaxIterations,
    /// Cumulative token budget exhausted.
    TokenBudget,
    /// Wall-clock timeout exceeded.
    Timeout,
    /// Recovery-attempt budget exhausted.
    MaxRecovery,
    /// The external provisioner failed to set up the workspace.
    ProvisionError,
    /// A scheduler-level error occurred (transport failure, tool
    /// infrastructure failure) that is not a normal part of the domain.
    HarnessError,
    /// An otherwise-uncategorized exception escaped the scheduler.
    Exception,
}

impl TerminalReason {
    /// The string form used in event-log and summary-document JSON,
    /// matching the spec's literal tag spellings.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            TerminalReason::Verified => "verified",
            TerminalReason::AgentDeclared => "agent_declared",
            TerminalReason::MaxIterations => "max_iterations",
            TerminalReason::TokenBudget => "token_budget",
            TerminalReason::Timeout => "timeout",
            TerminalReason::MaxRecovery => "max_recovery",
            TerminalReason::ProvisionError => "provision_error",
            TerminalReason::HarnessError => "harness_error",
            TerminalReason::Exception => "exception",
        }
    }
}

/// Output of one scheduler run (§3 Result).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResult {
    /// The task this result is for.
    pub task_id: String,
    /// True iff the chosen verifier passed.
    pub resolved: bool,
    /// Cumulative token/cost usage across the whole run, including any
    /// recoveries.
    pub usage: TokenUsage,
    /// Wall-clock seconds elapsed.
    pub wall_clock_seconds: f64,
    /// Number of tool calls dispatched.
    pub tool_call_count: u64,
    /// Number of verifier invocations.
    pub verification_count: u64,
    /// Number of recovery invocations.
    pub recovery_count: u64,
    /// Number of model-generation iterations.
    pub iteration_count: u64,
    /// Why the run ended.
    pub terminal_reason: TerminalReason,
    /// An error string, present only on error-class terminal reasons.
    #[serde(default)]
    pub error: Option<String>,
}

impl TaskResult {
    /// `resolved` must equal `terminal_reason == Verified` — §8's first
    /// universal invariant, enforced at construction so no caller can
    /// build an inconsistent result.
    #[must_use]
    pub fn new(task_id: impl Into<String>, terminal_reason: TerminalReason, usage: TokenUsage) -> Self {
        TaskResult {
            task_id: task_id.into(),
            resolved: terminal_reason == TerminalReason::Verified,
            usage,
            wall_clock_seconds: 0.0,
            tool_call_count: 0,
            verification_count: 0,
            recovery_count: 0,
            iteration_count: 0,
            terminal_reason,
            error: None,
        }
    }
}
