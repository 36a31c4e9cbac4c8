//! Predictions-document generation (§6 Predictions document).
//!
//! Grounded on `docker_eval.py`'s `build_predictions`: reads one
//! `{instance_id}.diff` per task from the patch directory, filters each to
//! its source-only changes, and writes one JSON array of prediction
//! objects next to the patch directory.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::warn;

use harness_types::GraderError;

use crate::patch::extract_source_only_patch;

/// One entry of the predictions document (§6): the patch the grader will
/// apply for `instance_id`, attributed to `model_name_or_path`.
#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    /// The benchmark instance this prediction is for.
    pub instance_id: String,
    /// The run name, standing in for a model identifier.
    pub model_name_or_path: String,
    /// The filtered (source-only) patch.
    pub model_patch: String,
}

/// Read `{patch_dir}/{instance_id}.diff` for every id in `instance_ids`,
/// filter each to source-only changes, and write the resulting array to
/// `{patch_dir}/../{run_name}_predictions.json`.
///
/// A missing patch file is skipped with a `tracing::warn!`, matching the
/// Python original's `print(f"WARNING: No patch found...")` — grading a
/// partial set of instances is expected, not an error.
///
/// # Errors
/// Returns [`GraderError::Io`] only if the predictions file itself cannot
/// be written.
pub async fn build_predictions(
    patch_dir: impl AsRef<Path>,
    instance_ids: &[String],
    run_name: &str,
) -> Result<PathBuf, GraderError> {
    let patch_dir = patch_dir.as_ref();
    let mut predictions = Vec::with_capacity(instance_ids.len());

    for instance_id in instance_ids {
        let diff_path = patch_dir.join(format!("{instance_id}.diff"));
        let full_diff = match tokio::fs::read_to_string(&diff_path).await {
            Ok(contents) => contents,
            Err(_) => {
                warn!(instance_id = %instance_id, "no patch found, skipping");
                continue;
            }
        };

        let source_diff = extract_source_only_patch(&full_diff);
        if source_diff.trim().is_empty() {
            warn!(instance_id = %instance_id, "no source changes (only test changes)");
        }

        predictions.push(Prediction {
            instance_id: instance_id.clone(),
            model_name_or_path: run_name.to_string(),
            model_patch: source_diff,
        });
    }

    let pred_path = patch_dir
        .parent()
        .unwrap_or(patch_dir)
        .join(format!("{run_name}_predictions.json"));
    let body = serde_json::to_string_pretty(&predictions).expect("predictions serialize infallibly");
    tokio::fs::write(&pred_path, body).await?;

    Ok(pred_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_predictions_for_existing_patches() {
        let dir = tempfile::tempdir().unwrap();
        let patch_dir = dir.path().join("patches");
        tokio::fs::create_dir_all(&patch_dir).await.unwrap();
        tokio::fs::write(
            patch_dir.join("task-1.diff"),
            "diff --git a/src/lib.rs b/src/lib.rs\n--- a\n+++ b\n@@ -1 +1 @@\n-x\n+y\n",
        )
        .await
        .unwrap();

        let pred_path = build_predictions(&patch_dir, &["task-1".to_string()], "v2_agent")
            .await
            .unwrap();

        let contents = tokio::fs::read_to_string(&pred_path).await.unwrap();
        let parsed: Vec<Prediction> = serde_json::from_str(&contents).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].instance_id, "task-1");
        assert_eq!(parsed[0].model_name_or_path, "v2_agent");
        assert!(parsed[0].model_patch.contains("src/lib.rs"));
    }

    #[tokio::test]
    async fn skips_missing_patch_files() {
        let dir = tempfile::tempdir().unwrap();
        let patch_dir = dir.path().join("patches");
        tokio::fs::create_dir_all(&patch_dir).await.unwrap();

        let pred_path = build_predictions(&patch_dir, &["missing".to_string()], "v2_agent")
            .await
            .unwrap();

        let contents = tokio::fs::read_to_string(&pred_path).await.unwrap();
        let parsed: Vec<Prediction> = serde_json::from_str(&contents).unwrap();
        assert!(parsed.is_empty());
    }
}
