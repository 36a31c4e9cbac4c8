//! Error taxonomy shared by every harness crate.
//!
//! One `thiserror` enum per concern, matching the teacher's per-crate error
//! convention. `is_retryable()` is only provided where retry semantics are
//! meaningful (transport errors).

use std::time::Duration;

/// Errors from workspace tool execution (file_read/file_write/file_edit/bash).
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// No such tool is registered.
    #[error("tool not found: {0}")]
    NotFound(String),
    /// Tool input failed schema/argument validation.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Tool ran but failed; this is returned to the model as a string, not
    /// usually surfaced as this variant — kept for infrastructure failures
    /// (e.g. the registry itself erroring before a tool body runs).
    #[error("execution failed: {0}")]
    ExecutionFailed(String),
    /// The command matched the install-command blocklist and was refused.
    #[error("blocked: {0}")]
    Blocked(String),
    /// The subprocess exceeded its timeout.
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    /// Underlying I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from LLM provider (model transport) operations.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// HTTP or network request failed.
    #[error("request failed: {0}")]
    RequestFailed(String),
    /// Provider rate-limited the request.
    #[error("rate limited")]
    RateLimited,
    /// Authentication/authorization failed.
    #[error("auth failed: {0}")]
    AuthFailed(String),
    /// Provider returned a response that could not be parsed into the
    /// canonical wire model.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    /// Request timed out.
    #[error("timeout after {0:?}")]
    Timeout(Duration),
    /// Catch-all for other errors.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl ProviderError {
    /// Whether retrying this request might succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProviderError::RateLimited
                | ProviderError::RequestFailed(_)
                | ProviderError::Timeout(_)
        )
    }
}

/// Errors from conversation-context bookkeeping.
#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    /// A tool_result block referenced a tool_use id absent from the
    /// preceding assistant message.
    #[error("dangling tool_use id: {0}")]
    DanglingToolUseId(String),
    /// Attempted to mutate a context whose terminal flag is already set.
    #[error("context already terminal")]
    AlreadyTerminal,
}

/// Errors from verifier strategies.
#[derive(Debug, thiserror::Error)]
pub enum VerifierError {
    /// No test/e2e command was configured for this task.
    #[error("no command configured")]
    NoCommand,
    /// The verifier needs a model transport but none was supplied.
    #[error("transport unavailable")]
    TransportUnavailable,
    /// The verification subprocess itself failed to run (not a test
    /// failure — the process could not be spawned or timed out).
    #[error("subprocess failed: {0}")]
    SubprocessFailed(String),
    /// The verifier's own model call failed.
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),
}

/// Errors from recovery strategies.
#[derive(Debug, thiserror::Error)]
pub enum RecoveryError {
    /// The recovery's summarization call failed.
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),
}

/// Errors from the agent-loop scheduler.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    /// Model transport failed.
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),
    /// A tool failed at the infrastructure level (not a normal tool-error
    /// string — those are folded into the tool result, not this variant).
    #[error("tool error: {0}")]
    Tool(#[from] ToolError),
    /// Context invariant violated.
    #[error("context error: {0}")]
    Context(#[from] ContextError),
}

/// Errors from the batch runner.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// Workspace provisioning failed for a task.
    #[error("provisioning failed: {0}")]
    Provision(String),
    /// A scheduler invocation failed.
    #[error("scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),
    /// A worker task panicked or was cancelled.
    #[error("join error: {0}")]
    Join(#[from] tokio::task::JoinError),
    /// I/O error writing patches or the summary document.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from loading the configuration document.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// The configuration file is not valid YAML for the expected shape.
    #[error("parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Errors from the grader adapter.
#[derive(Debug, thiserror::Error)]
pub enum GraderError {
    /// I/O error reading patches or writing the predictions document.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// The external container grader process failed to run.
    #[error("subprocess failed: {0}")]
    SubprocessFailed(String),
    /// The grader's report could not be parsed.
    #[error("report parse error: {0}")]
    ReportParse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_retryable() {
        assert!(ProviderError::RateLimited.is_retryable());
        assert!(ProviderError::RequestFailed("x".into()).is_retryable());
        assert!(ProviderError::Timeout(Duration::from_secs(1)).is_retryable());
        assert!(!ProviderError::AuthFailed("bad key".into()).is_retryable());
        assert!(!ProviderError::InvalidResponse("bad json".into()).is_retryable());
    }

    #[test]
    fn tool_error_display() {
        assert_eq!(
            ToolError::Blocked("pip install -e .".into()).to_string(),
            "blocked: pip install -e ."
        );
    }
}
