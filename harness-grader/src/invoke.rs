//! Invoking the external container grader and parsing its report.
//!
//! The grader itself (`swebench.harness.run_evaluation` in the Python
//! original, building and running per-instance Docker containers) is an
//! out-of-scope external collaborator (§1 "Deliberately out of scope").
//! This module shells out to it with the same flags `docker_eval.py`'s
//! `main()` passes and folds whatever JSON reports land in `report_dir`
//! into one [`GraderReport`], exactly mirroring that function's final
//! "look for result reports" loop.

use std::path::PathBuf;
use std::time::Duration;

use serde_json::Value;
use tracing::{info, warn};

use harness_types::GraderError;

/// One external container-grader invocation (§4.I's supplemented CLI
/// shape from `docker_eval.py`'s `main()`).
#[derive(Debug, Clone)]
pub struct GraderInvocation {
    /// Path to the grader executable (a Python interpreter running the
    /// `swebench` package, in the reference deployment).
    pub grader_command: String,
    /// Arguments inserted before the flags this adapter constructs — e.g.
    /// `["-m", "swebench.harness.run_evaluation"]`.
    pub grader_args_prefix: Vec<String>,
    /// SWE-bench dataset name.
    pub dataset_name: String,
    /// Dataset split.
    pub split: String,
    /// Run name; also the predictions' `model_name_or_path`.
    pub run_name: String,
    /// Parallel containers.
    pub max_workers: usize,
    /// Per-instance timeout.
    pub timeout: Duration,
    /// Output directory for grader reports.
    pub report_dir: PathBuf,
    /// Docker image namespace the grader pulls pre-built images from.
    pub namespace: String,
}

impl Default for GraderInvocation {
    fn default() -> Self {
        GraderInvocation {
            grader_command: "python3".to_string(),
            grader_args_prefix: vec!["-m".to_string(), "swebench.harness.run_evaluation".to_string()],
            dataset_name: "princeton-nlp/SWE-bench_Verified".to_string(),
            split: "test".to_string(),
            run_name: "v2_agent".to_string(),
            max_workers: 10,
            timeout: Duration::from_secs(900),
            report_dir: PathBuf::from("results/docker_eval"),
            namespace: "swebench".to_string(),
        }
    }
}

/// The parsed contents of every `*.json` report file the grader wrote to
/// `report_dir` (or `report_dir/{run_name}` when the grader nests its
/// output there), keyed by file name.
#[derive(Debug, Clone, Default)]
pub struct GraderReport {
    /// File name → parsed JSON contents.
    pub reports: Vec<(String, Value)>,
}

impl GraderReport {
    /// The `resolved_instances` count from the first report that has one,
    /// if any report matches the grader's aggregate-summary shape.
    #[must_use]
    pub fn resolved_count(&self) -> Option<u64> {
        self.reports
            .iter()
            .find_map(|(_, v)| v.get("resolved_instances").and_then(Value::as_u64))
    }
}

/// Invoke the external container grader with `predictions_path` and the
/// given `instance_ids`, then parse whatever JSON reports it leaves under
/// `invocation.report_dir`.
///
/// # Errors
/// [`GraderError::SubprocessFailed`] if the grader process cannot be
/// spawned or exits non-zero; [`GraderError::Io`] if `report_dir` cannot
/// be created or read; [`GraderError::ReportParse`] if a report file is
/// not valid JSON.
pub async fn run_grader(
    invocation: &GraderInvocation,
    predictions_path: &std::path::Path,
    instance_ids: &[String],
) -> Result<GraderReport, GraderError> {
    tokio::fs::create_dir_all(&invocation.report_dir).await?;

    let mut command = tokio::process::Command::new(&invocation.grader_command);
    command.args(&invocation.grader_args_prefix);
    command
        .arg("--dataset_name")
        .arg(&invocation.dataset_name)
        .arg("--split")
        .arg(&invocation.split)
        .arg("--predictions_path")
        .arg(predictions_path)
        .arg("--max_workers")
        .arg(invocation.max_workers.to_string())
        .arg("--run_id")
        .arg(&invocation.run_name)
        .arg("--timeout")
        .arg(invocation.timeout.as_secs().to_string())
        .arg("--cache_level")
        .arg("env")
        .arg("--namespace")
        .arg(&invocation.namespace)
        .arg("--report_dir")
        .arg(&invocation.report_dir);
    if !instance_ids.is_empty() {
        command.arg("--instance_ids").args(instance_ids);
    }

    // Strip ambient virtualenv indicators so the grader's own interpreter
    // selection isn't polluted by whichever venv launched this process
    // (§6 Environment).
    command.env_remove("VIRTUAL_ENV");
    if let Ok(path) = std::env::var("PATH") {
        let cleaned = path
            .split(':')
            .filter(|segment| !segment.contains(".venv") && !segment.contains("virtualenv"))
            .collect::<Vec<_>>()
            .join(":");
        command.env("PATH", cleaned);
    }
    command.env_remove("PYTHONPATH");

    info!(run_name = %invocation.run_name, instances = instance_ids.len(), "invoking external grader");

    let output = command
        .output()
        .await
        .map_err(|e| GraderError::SubprocessFailed(e.to_string()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(GraderError::SubprocessFailed(format!(
            "grader exited with {}: {stderr}",
            output.status
        )));
    }

    parse_reports(&invocation.report_dir, &invocation.run_name).await
}

/// Parse every `*.json` file under `report_dir` (and `report_dir/{run_name}`
/// if present), matching `docker_eval.py`'s result-discovery loop which
/// checks a `{run_name}` subdirectory first and falls back to a recursive
/// glob.
async fn parse_reports(report_dir: &std::path::Path, run_name: &str) -> Result<GraderReport, GraderError> {
    let nested = report_dir.join(run_name);
    let scan_dir = if tokio::fs::try_exists(&nested).await.unwrap_or(false) {
        nested
    } else {
        report_dir.to_path_buf()
    };

    let mut reports = Vec::new();
    let mut entries = match tokio::fs::read_dir(&scan_dir).await {
        Ok(entries) => entries,
        Err(_) => return Ok(GraderReport::default()),
    };

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("").to_string();
        let contents = tokio::fs::read_to_string(&path).await?;
        match serde_json::from_str(&contents) {
            Ok(value) => reports.push((name, value)),
            Err(e) => warn!(file = %name, error = %e, "failed to parse grader report"),
        }
    }

    Ok(GraderReport { reports })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn parse_reports_reads_json_files_from_nested_run_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("myrun");
        tokio::fs::create_dir_all(&nested).await.unwrap();
        tokio::fs::write(nested.join("summary.json"), r#"{"resolved_instances": 3}"#)
            .await
            .unwrap();

        let report = parse_reports(dir.path(), "myrun").await.unwrap();
        assert_eq!(report.resolved_count(), Some(3));
    }

    #[tokio::test]
    async fn parse_reports_falls_back_to_flat_dir_when_no_nested_run_dir() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("x.json"), r#"{"resolved_instances": 1}"#)
            .await
            .unwrap();

        let report = parse_reports(dir.path(), "nonexistent_run").await.unwrap();
        assert_eq!(report.resolved_count(), Some(1));
    }

    #[tokio::test]
    async fn parse_reports_returns_empty_when_dir_missing() {
        let report = parse_reports(&PathBuf::from("/no/such/dir"), "x").await.unwrap();
        assert!(report.reports.is_empty());
    }
}
