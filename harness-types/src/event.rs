//! The append-only structured event stream (§3 Event, §4.H).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One record in the experiment event log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Experiment id this event belongs to.
    pub experiment_id: String,
    /// Wall-clock timestamp the event was emitted.
    pub timestamp: DateTime<Utc>,
    /// Kind-specific payload.
    #[serde(flatten)]
    pub kind: EventKind,
}

impl Event {
    /// Construct an event stamped with the current time.
    #[must_use]
    pub fn new(experiment_id: impl Into<String>, kind: EventKind) -> Self {
        Event {
            experiment_id: experiment_id.into(),
            timestamp: Utc::now(),
            kind,
        }
    }
}

/// The tagged union of event payloads, discriminated by `"event"` in the
/// serialized JSON. Field shapes are grounded on
/// `original_source/logging/logger.py`'s `ExperimentLogger` methods.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EventKind {
    /// A scheduler run began.
    RunStart {
        /// Task id starting.
        task_id: String,
    },
    /// One model-generation call completed.
    LlmCall {
        /// Owning task id.
        task_id: String,
        /// Iteration number within the task (1-based).
        iteration: u64,
        /// Model identifier used.
        model: String,
        /// Plain input tokens.
        input_tokens: u64,
        /// Output tokens.
        output_tokens: u64,
        /// Cache-creation input tokens.
        cache_creation_tokens: u64,
        /// Cache-read input tokens.
        cache_read_tokens: u64,
        /// Cost of this call, rounded to 6 decimal places.
        cost_usd: f64,
    },
    /// One tool dispatch completed.
    ToolCall {
        /// Owning task id.
        task_id: String,
        /// Iteration number the tool was dispatched within.
        iteration: u64,
        /// Tool name.
        tool_name: String,
        /// Tool arguments as JSON.
        arguments: serde_json::Value,
        /// Wall-clock duration of the call, in milliseconds.
        duration_ms: u64,
        /// Tool output, truncated to 5000 chars for the audit trail.
        result_preview: String,
    },
    /// One verifier invocation completed.
    Verification {
        /// Owning task id.
        task_id: String,
        /// Which verification method ran.
        method: String,
        /// Verdict.
        passed: bool,
        /// Verdict message, truncated to 1000 chars.
        message: String,
        /// Tokens the verifier itself consumed.
        token_cost: u64,
    },
    /// One recovery invocation completed.
    Recovery {
        /// Owning task id.
        task_id: String,
        /// Which recovery strategy ran.
        strategy: String,
        /// 1-based recovery-attempt number.
        recovery_attempt: u64,
        /// The failing verifier's message that triggered recovery.
        verification_message: String,
    },
    /// A scheduler run ended.
    RunEnd {
        /// The full result for the completed run.
        result: crate::task::TaskResult,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{TaskResult, TerminalReason};
    use crate::request::TokenUsage;

    #[test]
    fn event_serializes_with_event_tag() {
        let event = Event::new(
            "exp1",
            EventKind::RunStart {
                task_id: "t1".into(),
            },
        );
        let v = serde_json::to_value(&event).unwrap();
        assert_eq!(v["event"], "run_start");
        assert_eq!(v["experiment_id"], "exp1");
    }

    #[test]
    fn run_end_carries_full_result() {
        let result = TaskResult::new("t1", TerminalReason::Verified, TokenUsage::default());
        let event = Event::new("exp1", EventKind::RunEnd { result });
        let v = serde_json::to_value(&event).unwrap();
        assert_eq!(v["result"]["task_id"], "t1");
    }
}
