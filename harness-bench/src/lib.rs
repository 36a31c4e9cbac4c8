//! SWE-bench task loading (§3 Task — loader side, not named as its own
//! module in the spec but required by §4.G's batch provisioning flow).
//!
//! Grounded on `original_source/agent_verify/benchmark/swebench.py`'s
//! `load_swebench_tasks`/`_build_test_command`.

use std::path::Path;

use harness_types::Task;
use thiserror::Error;

/// Errors loading a SWE-bench dataset file.
#[derive(Debug, Error)]
pub enum BenchError {
    /// The dataset file does not exist.
    #[error("SWE-bench dataset not found: {0}")]
    NotFound(String),
    /// The file could not be read.
    #[error("failed to read dataset: {0}")]
    Io(#[from] std::io::Error),
    /// A line of the JSONL file was not valid JSON.
    #[error("invalid JSON on line {line}: {source}")]
    InvalidJson {
        /// 1-indexed line number.
        line: usize,
        /// The underlying parse error.
        #[source]
        source: serde_json::Error,
    },
}

/// Load SWE-bench tasks from a JSONL dataset file. When `instance_ids` is
/// non-empty, only instances whose `instance_id` appears in it are kept;
/// an empty slice loads every instance in the file.
pub fn load_swebench_tasks(dataset_path: impl AsRef<Path>, instance_ids: &[String]) -> Result<Vec<Task>, BenchError> {
    let dataset_path = dataset_path.as_ref();
    if !dataset_path.exists() {
        return Err(BenchError::NotFound(dataset_path.display().to_string()));
    }

    let contents = std::fs::read_to_string(dataset_path)?;
    let mut tasks = Vec::new();

    for (idx, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let data: serde_json::Value =
            serde_json::from_str(line).map_err(|source| BenchError::InvalidJson { line: idx + 1, source })?;

        let instance_id = data.get("instance_id").and_then(|v| v.as_str()).unwrap_or("").to_string();
        if !instance_ids.is_empty() && !instance_ids.iter().any(|id| id == &instance_id) {
            continue;
        }

        let mut task = Task::new(
            instance_id,
            data.get("problem_statement").and_then(|v| v.as_str()).unwrap_or("").to_string(),
        );
        task.repo = data.get("repo").and_then(|v| v.as_str()).unwrap_or("").to_string();
        task.base_commit = data.get("base_commit").and_then(|v| v.as_str()).unwrap_or("").to_string();
        task.test_command = build_test_command(&data);
        task.metadata.insert(
            "hints_text".to_string(),
            serde_json::Value::String(data.get("hints_text").and_then(|v| v.as_str()).unwrap_or("").to_string()),
        );
        task.metadata.insert(
            "patch".to_string(),
            serde_json::Value::String(data.get("patch").and_then(|v| v.as_str()).unwrap_or("").to_string()),
        );
        task.metadata.insert(
            "test_patch".to_string(),
            serde_json::Value::String(data.get("test_patch").and_then(|v| v.as_str()).unwrap_or("").to_string()),
        );
        task.metadata.insert(
            "version".to_string(),
            serde_json::Value::String(data.get("version").and_then(|v| v.as_str()).unwrap_or("").to_string()),
        );

        tasks.push(task);
    }

    Ok(tasks)
}

/// Derive a pytest invocation from SWE-bench's `FAIL_TO_PASS` field, which
/// is itself a JSON-encoded array of test node ids stored as a string.
/// Returns an empty string when the field is missing, empty, or malformed
/// — callers treat that as "no command configured" (§4.D's verifier Open
/// Question resolution).
fn build_test_command(data: &serde_json::Value) -> String {
    let Some(fail_to_pass) = data.get("FAIL_TO_PASS").and_then(|v| v.as_str()) else {
        return String::new();
    };
    if fail_to_pass.is_empty() {
        return String::new();
    }
    let Ok(serde_json::Value::Array(test_ids)) = serde_json::from_str::<serde_json::Value>(fail_to_pass) else {
        return String::new();
    };
    if test_ids.is_empty() {
        return String::new();
    }
    let joined = test_ids
        .iter()
        .filter_map(|v| v.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    format!("python -m pytest {joined} -x --tb=short")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_dataset(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
        file
    }

    #[test]
    fn missing_dataset_errors() {
        let result = load_swebench_tasks("/no/such/path.jsonl", &[]);
        assert!(matches!(result, Err(BenchError::NotFound(_))));
    }

    #[test]
    fn loads_all_instances_by_default() {
        let file = write_dataset(&[
            r#"{"instance_id": "a-1", "problem_statement": "fix a", "repo": "x/y", "base_commit": "abc"}"#,
            r#"{"instance_id": "a-2", "problem_statement": "fix b"}"#,
        ]);
        let tasks = load_swebench_tasks(file.path(), &[]).unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].task_id, "a-1");
        assert_eq!(tasks[0].repo, "x/y");
    }

    #[test]
    fn filters_by_instance_ids() {
        let file = write_dataset(&[
            r#"{"instance_id": "a-1", "problem_statement": "fix a"}"#,
            r#"{"instance_id": "a-2", "problem_statement": "fix b"}"#,
        ]);
        let tasks = load_swebench_tasks(file.path(), &["a-2".to_string()]).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].task_id, "a-2");
    }

    #[test]
    fn skips_blank_lines() {
        let file = write_dataset(&[r#"{"instance_id": "a-1", "problem_statement": "x"}"#, "", "   "]);
        let tasks = load_swebench_tasks(file.path(), &[]).unwrap();
        assert_eq!(tasks.len(), 1);
    }

    #[test]
    fn builds_pytest_command_from_fail_to_pass() {
        let file = write_dataset(&[
            r#"{"instance_id": "a-1", "problem_statement": "x", "FAIL_TO_PASS": "[\"tests/test_a.py::test_one\", \"tests/test_a.py::test_two\"]"}"#,
        ]);
        let tasks = load_swebench_tasks(file.path(), &[]).unwrap();
        assert_eq!(
            tasks[0].test_command,
            "python -m pytest tests/test_a.py::test_one tests/test_a.py::test_two -x --tb=short"
        );
    }

    #[test]
    fn empty_fail_to_pass_yields_empty_test_command() {
        let file = write_dataset(&[r#"{"instance_id": "a-1", "problem_statement": "x"}"#]);
        let tasks = load_swebench_tasks(file.path(), &[]).unwrap();
        assert_eq!(tasks[0].test_command, "");
    }

    #[test]
    fn malformed_json_line_errors_with_line_number() {
        let file = write_dataset(&[r#"{"instance_id": "a-1""#]);
        let result = load_swebench_tasks(file.path(), &[]);
        assert!(matches!(result, Err(BenchError::InvalidJson { line: 1, .. })));
    }

    #[test]
    fn metadata_carries_patch_and_version() {
        let file = write_dataset(&[
            r#"{"instance_id": "a-1", "problem_statement": "x", "patch": "diff --git a", "version": "1.0"}"#,
        ]);
        let tasks = load_swebench_tasks(file.path(), &[]).unwrap();
        assert_eq!(tasks[0].metadata["patch"], serde_json::json!("diff --git a"));
        assert_eq!(tasks[0].metadata["version"], serde_json::json!("1.0"));
    }
}
