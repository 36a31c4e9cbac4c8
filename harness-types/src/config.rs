//! The external configuration document (§6) and its enumerated settings.
//!
//! Grounded verbatim on `original_source/agent_verify/config.py`: the enum
//! string spellings, defaults, and the default system prompt all match the
//! Python reference so existing experiment YAML files load unchanged.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Which provider backend to route through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderKind {
    /// Native Anthropic Messages API transport.
    Anthropic,
    /// Generic OpenAI-compatible chat-completions transport.
    OpenaiCompatible,
    /// An OpenAI-compatible vLLM server (same transport, different default
    /// base URL and no required API key).
    Vllm,
    /// A local OpenAI-compatible endpoint (same transport).
    Local,
}

/// Which verifier strategy to run (§4.D).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationMethod {
    /// V0: always passes.
    None,
    /// V1: model self-review.
    SelfReview,
    /// V2: runs the task's test command.
    TestExecution,
    /// V3: model spec comparison.
    SpecComparison,
    /// V4: runs the task's e2e command.
    E2e,
}

/// When the verifier runs (§4.F granularity policy).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationGranularity {
    /// G1: only at task end (agent declares `TASK_COMPLETE`).
    TaskEndOnly,
    /// G2: nominally per-feature; this implementation treats it as an
    /// alias of G1 (see DESIGN.md's Open Question (i) decision).
    PerFeature,
    /// G3: after every tool dispatch.
    PerStep,
}

/// Which recovery strategy to run on verification failure (§4.E).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryStrategyType {
    /// R1: append feedback, keep the same context.
    RetryInContext,
    /// R2: summarize then start a fresh context seeded with the summary.
    CompactAndRetry,
    /// R3: start a fresh context with no summary call.
    FreshRestart,
}

/// Model/provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider backend.
    #[serde(default = "default_provider")]
    pub provider: ProviderKind,
    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,
    /// Maximum output tokens per call.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Sampling temperature.
    #[serde(default)]
    pub temperature: f64,
    /// Override base URL (required for `local`/`vllm`, optional otherwise).
    #[serde(default)]
    pub base_url: Option<String>,
    /// Override API key (defaults to reading the provider's standard
    /// environment variable).
    #[serde(default)]
    pub api_key: Option<String>,
}

fn default_provider() -> ProviderKind {
    ProviderKind::Anthropic
}
fn default_model() -> String {
    "claude-sonnet-4-6".to_string()
}
fn default_max_tokens() -> u32 {
    8192
}

impl Default for LlmConfig {
    fn default() -> Self {
        LlmConfig {
            provider: default_provider(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: 0.0,
            base_url: None,
            api_key: None,
        }
    }
}

/// The default system prompt handed to the model transport, describing the
/// agent's role and the `TASK_COMPLETE` completion protocol.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a software engineer fixing a bug described below. \
Use the provided tools to inspect and modify files in your workspace and to run shell commands. \
Work only within the workspace directory. When you believe the task is complete, say so and include \
the literal text TASK_COMPLETE in your response.";

/// Per-task harness settings (§6 "harness settings").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Model/provider settings.
    #[serde(default)]
    pub llm: LlmConfig,
    /// Which verifier to run.
    #[serde(default = "default_verification_method")]
    pub verification_method: VerificationMethod,
    /// When the verifier runs.
    #[serde(default = "default_verification_granularity")]
    pub verification_granularity: VerificationGranularity,
    /// Which recovery strategy to run on failure.
    #[serde(default = "default_recovery_strategy")]
    pub recovery_strategy: RecoveryStrategyType,
    /// Iteration budget.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u64,
    /// Recovery-attempt budget.
    #[serde(default = "default_max_recovery_attempts")]
    pub max_recovery_attempts: u64,
    /// Cumulative token budget.
    #[serde(default = "default_max_tokens_budget")]
    pub max_tokens_budget: u64,
    /// Per-task wall-clock timeout, in seconds.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    /// Static system prompt.
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    /// Root directory under which per-task workspaces are provisioned.
    #[serde(default = "default_workspace_dir")]
    pub workspace_dir: PathBuf,
}

fn default_verification_method() -> VerificationMethod {
    VerificationMethod::None
}
fn default_verification_granularity() -> VerificationGranularity {
    VerificationGranularity::TaskEndOnly
}
fn default_recovery_strategy() -> RecoveryStrategyType {
    RecoveryStrategyType::RetryInContext
}
fn default_max_iterations() -> u64 {
    50
}
fn default_max_recovery_attempts() -> u64 {
    3
}
fn default_max_tokens_budget() -> u64 {
    500_000
}
fn default_timeout_seconds() -> u64 {
    600
}
fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_string()
}
fn default_workspace_dir() -> PathBuf {
    PathBuf::from("/tmp/agent-workspace")
}

impl Default for HarnessConfig {
    fn default() -> Self {
        HarnessConfig {
            llm: LlmConfig::default(),
            verification_method: default_verification_method(),
            verification_granularity: default_verification_granularity(),
            recovery_strategy: default_recovery_strategy(),
            max_iterations: default_max_iterations(),
            max_recovery_attempts: default_max_recovery_attempts(),
            max_tokens_budget: default_max_tokens_budget(),
            timeout_seconds: default_timeout_seconds(),
            system_prompt: default_system_prompt(),
            workspace_dir: default_workspace_dir(),
        }
    }
}

/// Top-level experiment configuration document (§6 Configuration document).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Experiment identifier, stamped onto every event and the summary.
    pub experiment_id: String,
    /// Benchmark name; only `"swebench"` is currently recognized.
    #[serde(default = "default_benchmark")]
    pub benchmark: String,
    /// Task identifiers to include; empty means all tasks in the benchmark.
    #[serde(default)]
    pub instance_ids: Vec<String>,
    /// Number of trials to run per task.
    #[serde(default = "default_num_trials")]
    pub num_trials: u32,
    /// Output directory for patches, event log, and summary.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Per-task harness settings.
    #[serde(default)]
    pub harness: HarnessConfig,
    /// Random seed forwarded to the benchmark adapter for reproducible
    /// task ordering; not consumed by the core.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_benchmark() -> String {
    "swebench".to_string()
}
fn default_num_trials() -> u32 {
    3
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("results")
}
fn default_seed() -> u64 {
    42
}

/// Load an [`ExperimentConfig`] from a YAML file on disk.
pub fn load_config(path: impl AsRef<Path>) -> Result<ExperimentConfig, ConfigError> {
    let text = std::fs::read_to_string(path)?;
    let config: ExperimentConfig = serde_yaml::from_str(&text)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn harness_config_defaults() {
        let config = HarnessConfig::default();
        assert_eq!(config.verification_method, VerificationMethod::None);
        assert_eq!(
            config.verification_granularity,
            VerificationGranularity::TaskEndOnly
        );
        assert_eq!(config.recovery_strategy, RecoveryStrategyType::RetryInContext);
        assert_eq!(config.max_iterations, 50);
    }

    #[test]
    fn experiment_config_defaults_num_trials() {
        let config = ExperimentConfig {
            experiment_id: "test_001".into(),
            benchmark: default_benchmark(),
            instance_ids: vec![],
            num_trials: default_num_trials(),
            output_dir: default_output_dir(),
            harness: HarnessConfig {
                verification_method: VerificationMethod::TestExecution,
                verification_granularity: VerificationGranularity::PerFeature,
                ..HarnessConfig::default()
            },
            seed: default_seed(),
        };
        assert_eq!(config.experiment_id, "test_001");
        assert_eq!(config.harness.verification_method, VerificationMethod::TestExecution);
        assert_eq!(config.num_trials, 3);
    }

    #[test]
    fn load_config_from_yaml() {
        let yaml = r#"
experiment_id: yaml_test
benchmark: swebench
num_trials: 2
harness:
  verification_method: test_execution
  verification_granularity: per_feature
  recovery_strategy: fresh_restart
"#;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, yaml).unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.experiment_id, "yaml_test");
        assert_eq!(config.harness.verification_method, VerificationMethod::TestExecution);
        assert_eq!(config.harness.recovery_strategy, RecoveryStrategyType::FreshRestart);
        assert_eq!(config.num_trials, 2);
    }
}
