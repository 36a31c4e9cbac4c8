//! Workspace provisioning (§4.G's "provisions every workspace sequentially").
//!
//! Repository cloning and commit checkout are named as an out-of-scope
//! external collaborator (§1); this module specifies only the interface
//! the batch runner drives and a local-directory stand-in for it. A real
//! deployment swaps in a [`WorkspaceProvisioner`] that clones `task.repo`
//! at `task.base_commit`.

use std::path::{Path, PathBuf};

use harness_types::{BoxFuture, Task};

/// Sets up the on-disk workspace a task's tools will operate in, returning
/// the directory to record onto `task.workspace_dir`.
///
/// Object-safe so the runner can hold one behind a trait object, following
/// the `DynProvider`/`ToolDyn` boxed-future pattern (§4.C, §4.B).
pub trait WorkspaceProvisioner: Send + Sync {
    /// Provision `task`'s workspace under `root`, returning its path.
    fn provision<'a>(&'a self, task: &'a Task, root: &'a Path) -> BoxFuture<'a, Result<PathBuf, String>>;
}

/// Creates an empty directory named after the task id under `root`. Does
/// not clone or check out anything — the stand-in named above.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalDirProvisioner;

impl WorkspaceProvisioner for LocalDirProvisioner {
    fn provision<'a>(&'a self, task: &'a Task, root: &'a Path) -> BoxFuture<'a, Result<PathBuf, String>> {
        Box::pin(async move {
            let dir = root.join(&task.task_id);
            tokio::fs::create_dir_all(&dir)
                .await
                .map_err(|e| format!("failed to create workspace {}: {e}", dir.display()))?;
            Ok(dir)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn local_dir_provisioner_creates_task_directory() {
        let root = tempfile::tempdir().unwrap();
        let task = Task::new("task-1", "fix it");
        let provisioner = LocalDirProvisioner;

        let dir = provisioner.provision(&task, root.path()).await.unwrap();

        assert_eq!(dir, root.path().join("task-1"));
        assert!(dir.is_dir());
    }
}
