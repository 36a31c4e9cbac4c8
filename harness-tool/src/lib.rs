//! Workspace tools (§4.B): `file_read`, `file_write`, `file_edit`, `bash`.

mod bash;
mod file_ops;
mod registry;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

pub use bash::BashTool;
pub use file_ops::{FileEditTool, FileReadTool, FileWriteTool};
pub use registry::ToolRegistry;

/// `bash`'s default per-command timeout, matching
/// `original_source/agent_verify/tools/bash.py`'s `timeout: int = 120`.
pub const DEFAULT_BASH_TIMEOUT: Duration = Duration::from_secs(120);

/// Build the default toolset (`file_read`, `file_write`, `file_edit`,
/// `bash`) rooted at `workspace_dir`, mirroring
/// `agent_verify.tools.create_default_toolset`.
#[must_use]
pub fn create_default_toolset(workspace_dir: impl Into<PathBuf>) -> ToolRegistry {
    let workspace_dir = workspace_dir.into();
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(FileReadTool::new(workspace_dir.clone())));
    registry.register(Arc::new(FileWriteTool::new(workspace_dir.clone())));
    registry.register(Arc::new(FileEditTool::new(workspace_dir.clone())));
    registry.register(Arc::new(BashTool::new(workspace_dir, DEFAULT_BASH_TIMEOUT)));
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_toolset_registers_all_four_tools() {
        let dir = tempfile::tempdir().unwrap();
        let registry = create_default_toolset(dir.path());
        let mut names = registry.tool_names();
        names.sort();
        assert_eq!(names, vec!["bash", "file_edit", "file_read", "file_write"]);
    }
}
