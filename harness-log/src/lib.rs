//! The append-only structured event log (§3 Event, §4.H).
//!
//! One `ExperimentLogger` is shared by `Arc` across the batch runner's
//! worker pool; a single `tokio::sync::Mutex`-guarded writer serializes
//! concurrent appends from different tasks, since POSIX atomic-append
//! guarantees apply to the underlying file descriptor, not to interleaved
//! buffered writers issued from multiple async tasks.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use tokio::sync::Mutex;
use tracing::warn;

use harness_types::event::{Event, EventKind};

/// Writes every [`Event`] for one experiment to `{output_dir}/{experiment_id}.jsonl`,
/// flushing after each line.
///
/// Field shapes and truncation/rounding discipline are grounded verbatim
/// on `original_source/agent_verify/logging/logger.py`'s `ExperimentLogger`.
pub struct ExperimentLogger {
    experiment_id: String,
    log_path: PathBuf,
    writer: Mutex<std::fs::File>,
}

impl ExperimentLogger {
    /// Open (creating if needed) the log file for `experiment_id` under
    /// `output_dir`, creating `output_dir` itself if missing.
    ///
    /// # Errors
    /// Returns the underlying `io::Error` if `output_dir` can't be created
    /// or the log file can't be opened for append.
    pub fn new(experiment_id: impl Into<String>, output_dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let experiment_id = experiment_id.into();
        let output_dir = output_dir.as_ref();
        std::fs::create_dir_all(output_dir)?;
        let log_path = output_dir.join(format!("{experiment_id}.jsonl"));
        let writer = OpenOptions::new().create(true).append(true).open(&log_path)?;
        Ok(ExperimentLogger {
            experiment_id,
            log_path,
            writer: Mutex::new(writer),
        })
    }

    /// The path events are being appended to.
    #[must_use]
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Append `kind` as one JSON line, stamped with this logger's
    /// experiment id and the current time.
    ///
    /// Write failures are logged via `tracing::warn!` and otherwise
    /// swallowed — matching the spec's policy that logging is observability,
    /// never a control-flow dependency for the scheduler.
    pub async fn log(&self, kind: EventKind) {
        let event = Event::new(self.experiment_id.clone(), kind);
        let line = match serde_json::to_string(&event) {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "failed to serialize event");
                return;
            }
        };
        let mut writer = self.writer.lock().await;
        if let Err(e) = writeln!(writer, "{line}") {
            warn!(error = %e, path = %self.log_path.display(), "failed to append event");
            return;
        }
        if let Err(e) = writer.flush() {
            warn!(error = %e, path = %self.log_path.display(), "failed to flush event log");
        }
    }

    /// Log a `run_start` event.
    pub async fn log_run_start(&self, task_id: impl Into<String>) {
        self.log(EventKind::RunStart { task_id: task_id.into() }).await;
    }

    /// Log an `llm_call` event. `cost_usd` is rounded to 6 decimal places.
    #[allow(clippy::too_many_arguments)]
    pub async fn log_llm_call(
        &self,
        task_id: impl Into<String>,
        iteration: u64,
        model: impl Into<String>,
        input_tokens: u64,
        output_tokens: u64,
        cache_creation_tokens: u64,
        cache_read_tokens: u64,
        cost_usd: f64,
    ) {
        self.log(EventKind::LlmCall {
            task_id: task_id.into(),
            iteration,
            model: model.into(),
            input_tokens,
            output_tokens,
            cache_creation_tokens,
            cache_read_tokens,
            cost_usd: round6(cost_usd),
        })
        .await;
    }

    /// Log a `tool_call` event. `result` is truncated to 5000 chars for
    /// `result_preview`.
    pub async fn log_tool_call(
        &self,
        task_id: impl Into<String>,
        iteration: u64,
        tool_name: impl Into<String>,
        arguments: serde_json::Value,
        duration_ms: u64,
        result: &str,
    ) {
        self.log(EventKind::ToolCall {
            task_id: task_id.into(),
            iteration,
            tool_name: tool_name.into(),
            arguments,
            duration_ms,
            result_preview: head_chars(result, 5000),
        })
        .await;
    }

    /// Log a `verification` event. `verification.message` is truncated to
    /// 1000 chars.
    pub async fn log_verification(
        &self,
        task_id: impl Into<String>,
        method: impl Into<String>,
        verification: &harness_types::VerificationResult,
    ) {
        self.log(EventKind::Verification {
            task_id: task_id.into(),
            method: method.into(),
            passed: verification.passed,
            message: verification.truncated_message(1000),
            token_cost: verification.token_cost,
        })
        .await;
    }

    /// Log a `recovery` event.
    pub async fn log_recovery(
        &self,
        task_id: impl Into<String>,
        strategy: impl Into<String>,
        recovery_attempt: u64,
        verification_message: impl Into<String>,
    ) {
        self.log(EventKind::Recovery {
            task_id: task_id.into(),
            strategy: strategy.into(),
            recovery_attempt,
            verification_message: verification_message.into(),
        })
        .await;
    }

    /// Log a `run_end` event.
    pub async fn log_run_end(&self, result: harness_types::TaskResult) {
        self.log(EventKind::RunEnd { result }).await;
    }
}

fn round6(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}

fn head_chars(s: &str, n: usize) -> String {
    if s.chars().count() <= n {
        s.to_string()
    } else {
        s.chars().take(n).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use harness_types::{TaskResult, TerminalReason, TokenUsage};
    use std::io::BufRead;

    fn read_lines(path: &Path) -> Vec<serde_json::Value> {
        let file = std::fs::File::open(path).unwrap();
        std::io::BufReader::new(file)
            .lines()
            .map(|l| serde_json::from_str(&l.unwrap()).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn writes_one_jsonl_line_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let logger = ExperimentLogger::new("exp1", dir.path()).unwrap();

        logger.log_run_start("t1").await;
        logger.log_llm_call("t1", 1, "claude-sonnet-4-6", 100, 20, 0, 0, 0.0012345).await;

        let lines = read_lines(logger.log_path());
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["event"], "run_start");
        assert_eq!(lines[0]["experiment_id"], "exp1");
        assert_eq!(lines[1]["event"], "llm_call");
        assert_eq!(lines[1]["cost_usd"], 0.001235);
    }

    #[tokio::test]
    async fn truncates_verification_message_and_tool_result_preview() {
        let dir = tempfile::tempdir().unwrap();
        let logger = ExperimentLogger::new("exp1", dir.path()).unwrap();

        let long_message = "x".repeat(2000);
        let verification = harness_types::VerificationResult::fail(long_message);
        logger.log_verification("t1", "self_review", &verification).await;

        let long_output = "y".repeat(6000);
        logger
            .log_tool_call("t1", 1, "bash", serde_json::json!({"command": "echo"}), 10, &long_output)
            .await;

        let lines = read_lines(logger.log_path());
        assert_eq!(lines[0]["message"].as_str().unwrap().chars().count(), 1000);
        assert_eq!(lines[1]["result_preview"].as_str().unwrap().chars().count(), 5000);
    }

    #[tokio::test]
    async fn log_run_end_embeds_full_result() {
        let dir = tempfile::tempdir().unwrap();
        let logger = ExperimentLogger::new("exp1", dir.path()).unwrap();

        let result = TaskResult::new("t1", TerminalReason::Verified, TokenUsage::default());
        logger.log_run_end(result).await;

        let lines = read_lines(logger.log_path());
        assert_eq!(lines[0]["result"]["task_id"], "t1");
        assert_eq!(lines[0]["result"]["terminal_reason"], "verified");
    }

    #[tokio::test]
    async fn appends_across_multiple_loggers_on_same_path() {
        let dir = tempfile::tempdir().unwrap();
        {
            let logger = ExperimentLogger::new("exp1", dir.path()).unwrap();
            logger.log_run_start("t1").await;
        }
        let logger = ExperimentLogger::new("exp1", dir.path()).unwrap();
        logger.log_run_start("t2").await;

        let lines = read_lines(logger.log_path());
        assert_eq!(lines.len(), 2);
    }
}
