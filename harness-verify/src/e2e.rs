//! V4: end-to-end verification — runs a task-specific external command
//! (Playwright, Puppeteer, or similar).
//!
//! A skeleton verifier in the Python original too: it only knows how to
//! run `task.metadata["e2e_command"]` and report its exit code. Richer
//! e2e harnesses are left to the benchmark adapter.

use std::time::Duration;

use harness_context::Context;
use harness_types::{BoxFuture, Task, VerificationResult};
use serde_json::json;

use crate::transport::VerifierTransport;
use crate::verifier::Verifier;

const E2E_COMMAND_KEY: &str = "e2e_command";

fn truncate_output(output: &str) -> String {
    if output.chars().count() <= 10_000 {
        return output.to_string();
    }
    let chars: Vec<char> = output.chars().collect();
    let head: String = chars[..5000].iter().collect();
    let tail: String = chars[chars.len() - 5000..].iter().collect();
    format!("{head}\n...[truncated]...\n{tail}")
}

/// Runs `task.metadata["e2e_command"]` via `bash -c` in the task
/// workspace, under a wall-clock timeout.
pub struct E2eVerifier {
    timeout: Duration,
}

impl E2eVerifier {
    /// Construct a verifier with the given subprocess timeout. The
    /// Python original defaults to 300 seconds.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for E2eVerifier {
    fn default() -> Self {
        Self::new(Duration::from_secs(300))
    }
}

impl Verifier for E2eVerifier {
    fn method_name(&self) -> &'static str {
        "e2e"
    }

    fn verify<'a>(
        &'a self,
        _context: &'a Context,
        task: &'a Task,
        _transport: Option<&'a dyn VerifierTransport>,
    ) -> BoxFuture<'a, VerificationResult> {
        Box::pin(async move {
            let Some(e2e_command) = task.metadata.get(E2E_COMMAND_KEY).and_then(|v| v.as_str()) else {
                return VerificationResult::fail("No E2E verification command specified for this task");
            };

            let mut command = tokio::process::Command::new("bash");
            command
                .arg("-c")
                .arg(e2e_command)
                .current_dir(task.workspace_dir_or_default())
                .stdout(std::process::Stdio::piped())
                .stderr(std::process::Stdio::piped());

            let spawned = match command.spawn() {
                Ok(child) => child,
                Err(e) => return VerificationResult::fail(format!("E2E verification error: {e}")),
            };

            let output = match tokio::time::timeout(self.timeout, spawned.wait_with_output()).await {
                Ok(Ok(output)) => output,
                Ok(Err(e)) => return VerificationResult::fail(format!("E2E verification error: {e}")),
                Err(_) => {
                    return VerificationResult::fail(format!(
                        "E2E verification timed out after {}s",
                        self.timeout.as_secs()
                    ));
                }
            };

            let mut combined = String::from_utf8_lossy(&output.stdout).to_string();
            combined.push_str(&String::from_utf8_lossy(&output.stderr));
            let combined = truncate_output(&combined);

            let exit_code = output.status.code().unwrap_or(-1);
            let passed = exit_code == 0;

            let mut result = if passed {
                VerificationResult::pass("E2E verification passed")
            } else {
                VerificationResult::fail("E2E verification failed")
            };
            result.details.insert("exit_code".into(), json!(exit_code));
            result.details.insert("output".into(), json!(combined));
            result.details.insert("e2e_command".into(), json!(e2e_command));
            result
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use harness_types::Task;

    fn task_with_e2e(command: &str) -> Task {
        let mut task = Task::new("t1", "fix it");
        task.metadata.insert(E2E_COMMAND_KEY.into(), json!(command));
        task
    }

    #[tokio::test]
    async fn fails_with_no_e2e_command() {
        let context = Context::new();
        let task = Task::new("t1", "fix it");
        let result = E2eVerifier::default().verify(&context, &task, None).await;
        assert!(!result.passed);
        assert!(result.message.contains("No E2E"));
    }

    #[tokio::test]
    async fn passes_on_exit_zero() {
        let context = Context::new();
        let task = task_with_e2e("exit 0");
        let result = E2eVerifier::default().verify(&context, &task, None).await;
        assert!(result.passed);
    }

    #[tokio::test]
    async fn fails_on_nonzero_exit() {
        let context = Context::new();
        let task = task_with_e2e("exit 2");
        let result = E2eVerifier::default().verify(&context, &task, None).await;
        assert!(!result.passed);
        assert_eq!(result.details["exit_code"], json!(2));
    }

    #[tokio::test]
    async fn times_out() {
        let context = Context::new();
        let task = task_with_e2e("sleep 5");
        let verifier = E2eVerifier::new(Duration::from_millis(200));
        let result = verifier.verify(&context, &task, None).await;
        assert!(!result.passed);
        assert!(result.message.contains("timed out"));
    }

    #[test]
    fn truncate_output_keeps_head_and_tail() {
        let long = "x".repeat(20_000);
        let truncated = truncate_output(&long);
        assert!(truncated.contains("...[truncated]..."));
        assert!(truncated.len() < long.len());
    }
}
