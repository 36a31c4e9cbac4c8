//! V2: test execution — runs the task's existing test suite.

use std::time::Duration;

use harness_context::Context;
use harness_types::{BoxFuture, Task, VerificationResult};
use serde_json::json;

use crate::transport::VerifierTransport;
use crate::verifier::Verifier;

fn head_chars(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}

/// Runs `task.test_command` via `bash -c` in the task workspace, under a
/// wall-clock timeout.
pub struct TestExecutionVerifier {
    timeout: Duration,
}

impl TestExecutionVerifier {
    /// Construct a verifier with the given subprocess timeout. The
    /// Python original defaults to 300 seconds.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for TestExecutionVerifier {
    fn default() -> Self {
        Self::new(Duration::from_secs(300))
    }
}

impl Verifier for TestExecutionVerifier {
    fn method_name(&self) -> &'static str {
        "test_execution"
    }

    fn verify<'a>(
        &'a self,
        _context: &'a Context,
        task: &'a Task,
        _transport: Option<&'a dyn VerifierTransport>,
    ) -> BoxFuture<'a, VerificationResult> {
        Box::pin(async move {
            if task.test_command.is_empty() {
                return VerificationResult::fail("No test command specified for this task");
            }

            let mut command = tokio::process::Command::new("bash");
            command
                .arg("-c")
                .arg(&task.test_command)
                .current_dir(task.workspace_dir_or_default())
                .stdout(std::process::Stdio::piped())
                .stderr(std::process::Stdio::piped());

            let spawned = match command.spawn() {
                Ok(child) => child,
                Err(e) => return VerificationResult::fail(format!("Error running tests: {e}")),
            };

            let output = match tokio::time::timeout(self.timeout, spawned.wait_with_output()).await {
                Ok(Ok(output)) => output,
                Ok(Err(e)) => return VerificationResult::fail(format!("Error running tests: {e}")),
                Err(_) => {
                    let mut result = VerificationResult::fail(format!(
                        "Tests timed out after {}s",
                        self.timeout.as_secs()
                    ));
                    result.details.insert("test_command".into(), json!(task.test_command));
                    result.details.insert("timeout".into(), json!(self.timeout.as_secs()));
                    return result;
                }
            };

            let stdout = String::from_utf8_lossy(&output.stdout).to_string();
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();

            let exit_code = output.status.code().unwrap_or(-1);
            let passed = exit_code == 0;

            let mut result = if passed {
                VerificationResult::pass(format!("Tests passed (exit code {exit_code})"))
            } else {
                VerificationResult::fail(format!("Tests failed (exit code {exit_code})"))
            };
            result.details.insert("exit_code".into(), json!(exit_code));
            result.details.insert("stdout".into(), json!(head_chars(&stdout, 5000)));
            result.details.insert("stderr".into(), json!(head_chars(&stderr, 5000)));
            result.details.insert("test_command".into(), json!(task.test_command));
            result
        })
    }
}
