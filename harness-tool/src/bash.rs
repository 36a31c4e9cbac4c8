//! `bash` — executes a shell command inside the task workspace (§4.B).
//!
//! Output assembly and the timeout message are grounded verbatim on
//! `original_source/agent_verify/tools/bash.py`. The install-command
//! blocklist has no precedent in the Python original (confirmed absent
//! by reading `bash.py` in full) and is implemented fresh from the
//! specification's prose.

use std::path::PathBuf;
use std::time::Duration;

use harness_types::{BoxFuture, ToolDyn, ToolError};
use serde_json::json;

/// Case-insensitive substrings that mark a command as attempting to
/// install packages into the ambient runtime rather than operating on
/// the task's own workspace.
const BLOCKED_PATTERNS: &[&str] = &[
    "pip install -e",
    "pip install --editable",
    "setup.py develop",
    "setup.py install",
];

fn blocked_reason(command: &str) -> Option<&'static str> {
    let lower = command.to_lowercase();
    BLOCKED_PATTERNS.iter().find(|p| lower.contains(*p)).copied()
}

/// Runs `sh -c <command>` with a wall-clock timeout, inside the task
/// workspace directory.
pub struct BashTool {
    workspace_dir: PathBuf,
    timeout: Duration,
}

impl BashTool {
    /// Construct a tool rooted at `workspace_dir` with the given
    /// per-command timeout.
    #[must_use]
    pub fn new(workspace_dir: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            workspace_dir: workspace_dir.into(),
            timeout,
        }
    }
}

impl ToolDyn for BashTool {
    fn name(&self) -> &str {
        "bash"
    }

    fn description(&self) -> &str {
        "Execute a shell command in the task workspace and return its output."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "command": {"type": "string", "description": "The shell command to execute"},
            },
            "required": ["command"],
        })
    }

    fn call(&self, input: serde_json::Value) -> BoxFuture<'_, Result<String, ToolError>> {
        Box::pin(async move {
            let command = input
                .get("command")
                .and_then(|v| v.as_str())
                .ok_or_else(|| ToolError::InvalidInput("missing \"command\"".into()))?
                .to_string();

            if let Some(pattern) = blocked_reason(&command) {
                return Ok(format!(
                    "Error: command blocked — installing packages into the ambient runtime is not permitted (matched \"{pattern}\")"
                ));
            }

            let mut child = tokio::process::Command::new("sh")
                .arg("-c")
                .arg(&command)
                .current_dir(&self.workspace_dir)
                .stdout(std::process::Stdio::piped())
                .stderr(std::process::Stdio::piped())
                .spawn()
                .map_err(|e| ToolError::ExecutionFailed(e.to_string()))?;

            let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
                Ok(result) => result.map_err(|e| ToolError::ExecutionFailed(e.to_string()))?,
                Err(_) => {
                    return Ok(format!(
                        "Error: Command timed out after {} seconds",
                        self.timeout.as_secs()
                    ));
                }
            };

            let stdout = String::from_utf8_lossy(&output.stdout);
            let stderr = String::from_utf8_lossy(&output.stderr);
            let mut combined = String::new();
            combined.push_str(&stdout);
            if !stderr.is_empty() {
                if !combined.is_empty() {
                    combined.push('\n');
                }
                combined.push_str(&stderr);
            }

            let body = if combined.is_empty() {
                "[No output]".to_string()
            } else {
                combined
            };

            let exit_code = output.status.code().unwrap_or(-1);
            Ok(if exit_code != 0 {
                format!("{body}\n[Exit code: {exit_code}]")
            } else {
                body
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bash_tool_captures_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let tool = BashTool::new(dir.path(), Duration::from_secs(10));
        let result = tool.call(json!({"command": "echo hello"})).await.unwrap();
        assert!(result.contains("hello"));
        assert!(!result.contains("[Exit code:"));
    }

    #[tokio::test]
    async fn bash_tool_reports_nonzero_exit() {
        let dir = tempfile::tempdir().unwrap();
        let tool = BashTool::new(dir.path(), Duration::from_secs(10));
        let result = tool.call(json!({"command": "exit 3"})).await.unwrap();
        assert!(result.contains("[Exit code: 3]"));
    }

    #[tokio::test]
    async fn bash_tool_no_output_sentinel() {
        let dir = tempfile::tempdir().unwrap();
        let tool = BashTool::new(dir.path(), Duration::from_secs(10));
        let result = tool.call(json!({"command": "true"})).await.unwrap();
        assert!(result.contains("[No output]"));
    }

    #[tokio::test]
    async fn bash_tool_passes_through_whitespace_only_output() {
        let dir = tempfile::tempdir().unwrap();
        let tool = BashTool::new(dir.path(), Duration::from_secs(10));
        let result = tool.call(json!({"command": "echo ' '"})).await.unwrap();
        assert!(!result.contains("[No output]"));
    }

    #[tokio::test]
    async fn bash_tool_joins_stdout_and_stderr_with_newline() {
        let dir = tempfile::tempdir().unwrap();
        let tool = BashTool::new(dir.path(), Duration::from_secs(10));
        let result = tool
            .call(json!({"command": "echo out; echo err 1>&2"}))
            .await
            .unwrap();
        assert!(result.contains("out\nerr"));
    }

    #[tokio::test]
    async fn bash_tool_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let tool = BashTool::new(dir.path(), Duration::from_millis(200));
        let result = tool.call(json!({"command": "sleep 5"})).await.unwrap();
        assert!(result.contains("timed out"));
    }

    #[tokio::test]
    async fn bash_tool_blocks_editable_install() {
        let dir = tempfile::tempdir().unwrap();
        let tool = BashTool::new(dir.path(), Duration::from_secs(10));
        let result = tool.call(json!({"command": "pip install -e ."})).await.unwrap();
        assert!(result.contains("blocked"));
    }

    #[tokio::test]
    async fn bash_tool_blocks_setup_py_develop() {
        let dir = tempfile::tempdir().unwrap();
        let tool = BashTool::new(dir.path(), Duration::from_secs(10));
        let result = tool
            .call(json!({"command": "python setup.py develop"}))
            .await
            .unwrap();
        assert!(result.contains("blocked"));
    }

    #[tokio::test]
    async fn bash_tool_blocklist_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let tool = BashTool::new(dir.path(), Duration::from_secs(10));
        let result = tool
            .call(json!({"command": "PIP INSTALL --EDITABLE ."}))
            .await
            .unwrap();
        assert!(result.contains("blocked"));
    }

    #[tokio::test]
    async fn bash_tool_allows_ordinary_pip_install() {
        let dir = tempfile::tempdir().unwrap();
        let tool = BashTool::new(dir.path(), Duration::from_secs(10));
        let result = tool.call(json!({"command": "echo pip install requests"})).await.unwrap();
        assert!(!result.contains("blocked"));
    }
}
