//! `file_read`, `file_write`, `file_edit` (§4.B).
//!
//! Exact error/success message strings are grounded verbatim on
//! `original_source/agent_verify/tools/file_ops.py`.

use std::path::PathBuf;

use harness_types::{BoxFuture, ToolDyn, ToolError};
use serde_json::json;

/// Reads `workspace/path`.
pub struct FileReadTool {
    workspace_dir: PathBuf,
}

impl FileReadTool {
    /// Construct a tool rooted at `workspace_dir`.
    #[must_use]
    pub fn new(workspace_dir: impl Into<PathBuf>) -> Self {
        Self {
            workspace_dir: workspace_dir.into(),
        }
    }
}

impl ToolDyn for FileReadTool {
    fn name(&self) -> &str {
        "file_read"
    }

    fn description(&self) -> &str {
        "Read the contents of a file at the given path."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "path": {"type": "string", "description": "File path relative to workspace root"},
            },
            "required": ["path"],
        })
    }

    fn call(&self, input: serde_json::Value) -> BoxFuture<'_, Result<String, ToolError>> {
        Box::pin(async move {
            let path = input
                .get("path")
                .and_then(|v| v.as_str())
                .ok_or_else(|| ToolError::InvalidInput("missing \"path\"".into()))?
                .to_string();
            let file_path = self.workspace_dir.join(&path);
            if !file_path.is_file() {
                return Ok(format!("Error: File not found: {path}"));
            }
            match tokio::fs::read_to_string(&file_path).await {
                Ok(content) => Ok(content),
                Err(e) => Ok(format!("Error reading file: {e}")),
            }
        })
    }
}

/// Creates parent directories and writes (overwrites) `workspace/path`.
pub struct FileWriteTool {
    workspace_dir: PathBuf,
}

impl FileWriteTool {
    /// Construct a tool rooted at `workspace_dir`.
    #[must_use]
    pub fn new(workspace_dir: impl Into<PathBuf>) -> Self {
        Self {
            workspace_dir: workspace_dir.into(),
        }
    }
}

impl ToolDyn for FileWriteTool {
    fn name(&self) -> &str {
        "file_write"
    }

    fn description(&self) -> &str {
        "Write content to a file at the given path. Creates parent directories if needed."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "path": {"type": "string", "description": "File path relative to workspace root"},
                "content": {"type": "string", "description": "Content to write to the file"},
            },
            "required": ["path", "content"],
        })
    }

    fn call(&self, input: serde_json::Value) -> BoxFuture<'_, Result<String, ToolError>> {
        Box::pin(async move {
            let path = input
                .get("path")
                .and_then(|v| v.as_str())
                .ok_or_else(|| ToolError::InvalidInput("missing \"path\"".into()))?
                .to_string();
            let content = input
                .get("content")
                .and_then(|v| v.as_str())
                .ok_or_else(|| ToolError::InvalidInput("missing \"content\"".into()))?
                .to_string();
            let file_path = self.workspace_dir.join(&path);
            if let Some(parent) = file_path.parent() {
                if let Err(e) = tokio::fs::create_dir_all(parent).await {
                    return Ok(format!("Error writing file: {e}"));
                }
            }
            match tokio::fs::write(&file_path, content).await {
                Ok(()) => Ok(format!("Successfully wrote to {path}")),
                Err(e) => Ok(format!("Error writing file: {e}")),
            }
        })
    }
}

/// Replaces a single unique occurrence of `old_string` with `new_string`
/// in `workspace/path`. Refuses ambiguous edits (§4.B's deliberate safety
/// policy).
pub struct FileEditTool {
    workspace_dir: PathBuf,
}

impl FileEditTool {
    /// Construct a tool rooted at `workspace_dir`.
    #[must_use]
    pub fn new(workspace_dir: impl Into<PathBuf>) -> Self {
        Self {
            workspace_dir: workspace_dir.into(),
        }
    }
}

impl ToolDyn for FileEditTool {
    fn name(&self) -> &str {
        "file_edit"
    }

    fn description(&self) -> &str {
        "Edit a file by replacing old_string with new_string."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "path": {"type": "string", "description": "File path relative to workspace root"},
                "old_string": {"type": "string", "description": "The exact string to find and replace"},
                "new_string": {"type": "string", "description": "The replacement string"},
            },
            "required": ["path", "old_string", "new_string"],
        })
    }

    fn call(&self, input: serde_json::Value) -> BoxFuture<'_, Result<String, ToolError>> {
        Box::pin(async move {
            let path = input
                .get("path")
                .and_then(|v| v.as_str())
                .ok_or_else(|| ToolError::InvalidInput("missing \"path\"".into()))?
                .to_string();
            let old_string = input
                .get("old_string")
                .and_then(|v| v.as_str())
                .ok_or_else(|| ToolError::InvalidInput("missing \"old_string\"".into()))?;
            let new_string = input
                .get("new_string")
                .and_then(|v| v.as_str())
                .ok_or_else(|| ToolError::InvalidInput("missing \"new_string\"".into()))?;

            let file_path = self.workspace_dir.join(&path);
            if !file_path.is_file() {
                return Ok(format!("Error: File not found: {path}"));
            }
            let content = match tokio::fs::read_to_string(&file_path).await {
                Ok(content) => content,
                Err(e) => return Ok(format!("Error editing file: {e}")),
            };

            let count = content.matches(old_string).count();
            if count == 0 {
                return Ok(format!("Error: old_string not found in {path}"));
            }
            if count > 1 {
                return Ok(format!(
                    "Error: old_string found {count} times in {path}. Provide more context to make it unique."
                ));
            }

            let new_content = content.replacen(old_string, new_string, 1);
            match tokio::fs::write(&file_path, new_content).await {
                Ok(()) => Ok(format!("Successfully edited {path}")),
                Err(e) => Ok(format!("Error editing file: {e}")),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn file_read_write_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let write_tool = FileWriteTool::new(dir.path());
        let read_tool = FileReadTool::new(dir.path());

        let result = write_tool
            .call(json!({"path": "test.txt", "content": "hello world"}))
            .await
            .unwrap();
        assert!(result.contains("Successfully"));

        let result = read_tool.call(json!({"path": "test.txt"})).await.unwrap();
        assert_eq!(result, "hello world");
    }

    #[tokio::test]
    async fn file_read_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let read_tool = FileReadTool::new(dir.path());
        let result = read_tool.call(json!({"path": "nonexistent.txt"})).await.unwrap();
        assert!(result.contains("Error"));
    }

    #[tokio::test]
    async fn file_edit_replaces_unique_occurrence() {
        let dir = tempfile::tempdir().unwrap();
        let write_tool = FileWriteTool::new(dir.path());
        let edit_tool = FileEditTool::new(dir.path());
        let read_tool = FileReadTool::new(dir.path());

        write_tool
            .call(json!({"path": "test.py", "content": "def foo():\n    return 1\n"}))
            .await
            .unwrap();
        edit_tool
            .call(json!({"path": "test.py", "old_string": "return 1", "new_string": "return 42"}))
            .await
            .unwrap();
        let result = read_tool.call(json!({"path": "test.py"})).await.unwrap();
        assert!(result.contains("return 42"));
    }

    #[tokio::test]
    async fn file_edit_rejects_ambiguous_match() {
        let dir = tempfile::tempdir().unwrap();
        let write_tool = FileWriteTool::new(dir.path());
        let edit_tool = FileEditTool::new(dir.path());

        write_tool
            .call(json!({"path": "dup.txt", "content": "x\nx\n"}))
            .await
            .unwrap();
        let result = edit_tool
            .call(json!({"path": "dup.txt", "old_string": "x", "new_string": "y"}))
            .await
            .unwrap();
        assert!(result.contains("found 2 times"));
    }

    #[tokio::test]
    async fn file_edit_rejects_missing_old_string() {
        let dir = tempfile::tempdir().unwrap();
        let write_tool = FileWriteTool::new(dir.path());
        let edit_tool = FileEditTool::new(dir.path());

        write_tool.call(json!({"path": "a.txt", "content": "hello"})).await.unwrap();
        let result = edit_tool
            .call(json!({"path": "a.txt", "old_string": "goodbye", "new_string": "y"}))
            .await
            .unwrap();
        assert!(result.contains("not found"));
    }
}
