//! The batch runner (§4.G): sequential provisioning, a bounded worker pool,
//! and the summary document.
//!
//! Grounded on `neuron-orch-local::LocalOrch::dispatch_many`'s
//! `tokio::spawn`-per-task-then-join-all pattern, bounded here by a
//! `tokio::sync::Semaphore` permit per worker slot since the teacher's
//! version had no concurrency cap.

use std::sync::Arc;

use tokio::sync::Semaphore;

use harness_loop::Scheduler;
use harness_log::ExperimentLogger;
use harness_types::{ExperimentConfig, RunnerError, Task, TaskResult, TerminalReason, TokenUsage};

use crate::provisioner::WorkspaceProvisioner;
use crate::summary::{build_summary, ResultRow, Summary};
use crate::transport::build_transport;

/// Default worker-pool width, matching §4.G's stated default.
pub const DEFAULT_WORKER_POOL_WIDTH: usize = 10;

/// Runs a whole experiment: every task, `num_trials` times, through the
/// scheduler.
pub struct BatchRunner {
    config: ExperimentConfig,
    logger: Arc<ExperimentLogger>,
    provisioner: Arc<dyn WorkspaceProvisioner>,
    worker_pool_width: usize,
}

impl BatchRunner {
    /// Build a runner from `config`, opening its event log under
    /// `config.output_dir`.
    ///
    /// # Errors
    /// [`RunnerError::Io`] if the event log cannot be opened.
    pub fn new(config: ExperimentConfig, provisioner: Arc<dyn WorkspaceProvisioner>) -> Result<Self, RunnerError> {
        let logger = ExperimentLogger::new(config.experiment_id.clone(), &config.output_dir)?;
        Ok(BatchRunner {
            config,
            logger: Arc::new(logger),
            provisioner,
            worker_pool_width: DEFAULT_WORKER_POOL_WIDTH,
        })
    }

    /// Override the worker-pool width (default [`DEFAULT_WORKER_POOL_WIDTH`]).
    #[must_use]
    pub fn worker_pool_width(mut self, width: usize) -> Self {
        self.worker_pool_width = width.max(1);
        self
    }

    /// Path the event log is being written to.
    #[must_use]
    pub fn log_path(&self) -> &std::path::Path {
        self.logger.log_path()
    }

    /// Run every task in `tasks` for `config.num_trials` trials, writing
    /// the resulting summary to `{output_dir}/{experiment_id}_summary.json`
    /// and returning it.
    ///
    /// Dataset ingestion (turning a benchmark store into `tasks`) is an
    /// out-of-scope external concern (§1); callers load `tasks` themselves
    /// (e.g. via `harness_bench::load_swebench_tasks`) before calling this.
    ///
    /// # Errors
    /// [`RunnerError::Io`] if the summary document cannot be written.
    pub async fn run_experiment(&self, tasks: Vec<Task>) -> Result<Summary, RunnerError> {
        let transport = build_transport(&self.config.harness.llm)?;

        let mut rows = Vec::with_capacity(tasks.len() * self.config.num_trials as usize);
        for trial in 1..=self.config.num_trials {
            let provisioned = self.provision_all(&tasks, trial).await;
            let results = self.run_trial(provisioned, transport.clone()).await;
            rows.extend(results.into_iter().map(|r| ResultRow::from_result(trial, &r)));
        }

        let summary = build_summary(&self.config.experiment_id, tasks.len(), self.config.num_trials, rows);
        self.write_summary(&summary).await?;
        Ok(summary)
    }

    /// Provision every task's workspace sequentially, so concurrent clones
    /// of the same origin repository can't race on disk (§4.G). A task
    /// whose provisioning fails keeps `workspace_dir = None`; it still
    /// enters the worker pool and surfaces as `ProvisionError` there,
    /// rather than silently dropping from the experiment.
    async fn provision_all(&self, tasks: &[Task], trial: u32) -> Vec<Task> {
        let root = self.config.output_dir.join("workspaces").join(trial.to_string());
        let mut provisioned = Vec::with_capacity(tasks.len());
        for task in tasks {
            let mut task = task.clone();
            match self.provisioner.provision(&task, &root).await {
                Ok(dir) => task.workspace_dir = Some(dir),
                Err(e) => {
                    tracing::warn!(task_id = %task.task_id, error = %e, "workspace provisioning failed");
                    task.workspace_dir = None;
                }
            }
            provisioned.push(task);
        }
        provisioned
    }

    /// Fan one scheduler invocation per task out across a
    /// `Semaphore`-bounded worker pool, then join all of them.
    async fn run_trial(&self, tasks: Vec<Task>, transport: Arc<dyn harness_types::DynProvider>) -> Vec<TaskResult> {
        let semaphore = Arc::new(Semaphore::new(self.worker_pool_width));
        let mut handles = Vec::with_capacity(tasks.len());

        for task in tasks {
            if task.workspace_dir.is_none() {
                let mut result = TaskResult::new(task.task_id.clone(), TerminalReason::ProvisionError, TokenUsage::default());
                result.error = Some("workspace provisioning failed".to_string());
                handles.push(tokio::spawn(async move { result }));
                continue;
            }

            let permit = semaphore.clone().acquire_owned();
            let mut harness_config = self.config.harness.clone();
            let logger = self.logger.clone();
            let transport = transport.clone();

            handles.push(tokio::spawn(async move {
                let _permit = permit.await.expect("semaphore never closed");
                harness_config.workspace_dir = task.workspace_dir_or_default();
                let scheduler = Scheduler::new(harness_config, transport, Some(logger));
                scheduler.run(task).await
            }));
        }

        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.await {
                Ok(result) => results.push(result),
                Err(e) => {
                    tracing::error!(error = %e, "worker task panicked");
                    let mut result = TaskResult::new("unknown", TerminalReason::Exception, TokenUsage::default());
                    result.error = Some(e.to_string());
                    results.push(result);
                }
            }
        }
        results
    }

    async fn write_summary(&self, summary: &Summary) -> Result<(), RunnerError> {
        let path = self
            .config
            .output_dir
            .join(format!("{}_summary.json", self.config.experiment_id));
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let body = serde_json::to_string_pretty(summary).expect("summary serializes infallibly");
        tokio::fs::write(&path, body).await?;
        Ok(())
    }

    /// The path the summary document will be (or was) written to.
    #[must_use]
    pub fn summary_path(&self) -> std::path::PathBuf {
        self.config.output_dir.join(format!("{}_summary.json", self.config.experiment_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provisioner::LocalDirProvisioner;
    use harness_types::{HarnessConfig, LlmConfig, ProviderKind, VerificationMethod};

    fn test_config(output_dir: &std::path::Path) -> ExperimentConfig {
        ExperimentConfig {
            experiment_id: "exp_test".to_string(),
            benchmark: "swebench".to_string(),
            instance_ids: vec![],
            num_trials: 1,
            output_dir: output_dir.to_path_buf(),
            harness: HarnessConfig {
                llm: LlmConfig {
                    provider: ProviderKind::Anthropic,
                    api_key: Some("sk-ant-test".to_string()),
                    ..LlmConfig::default()
                },
                verification_method: VerificationMethod::None,
                max_iterations: 0,
                ..HarnessConfig::default()
            },
            seed: 42,
        }
    }

    #[tokio::test]
    async fn run_experiment_with_zero_max_iterations_terminates_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let runner = BatchRunner::new(config, Arc::new(LocalDirProvisioner)).unwrap();

        let tasks = vec![Task::new("task-1", "fix the bug")];
        let summary = runner.run_experiment(tasks).await.unwrap();

        assert_eq!(summary.num_tasks, 1);
        assert_eq!(summary.results.len(), 1);
        assert_eq!(summary.results[0].completion_reason, "max_iterations");
        assert!(runner.summary_path().exists());
    }

    #[tokio::test]
    async fn empty_task_list_yields_empty_summary() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let runner = BatchRunner::new(config, Arc::new(LocalDirProvisioner)).unwrap();

        let summary = runner.run_experiment(vec![]).await.unwrap();

        assert_eq!(summary.num_tasks, 0);
        assert_eq!(summary.resolve_rate, 0.0);
    }
}
