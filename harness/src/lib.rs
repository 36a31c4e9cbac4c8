//! Umbrella crate for the agent-repair evaluation harness.
//!
//! Re-exports every `harness-*` crate behind a named module, the way
//! `agent-blocks` composes the `agent-*` family. Pull in individual
//! crates directly for faster incremental builds; use this crate for a
//! one-dependency experiment binary.

/// Shared types, traits, and configuration — the lingua franca of every
/// other module.
pub mod types {
    pub use harness_types::*;
}

/// The per-run conversation context.
pub mod context {
    pub use harness_context::*;
}

/// Workspace tools: `file_read`, `file_write`, `file_edit`, `bash`.
pub mod tool {
    pub use harness_tool::*;
}

/// Verifier strategies V0-V4.
pub mod verify {
    pub use harness_verify::*;
}

/// Recovery strategies R1-R3.
pub mod recover {
    pub use harness_recover::*;
}

/// The agent-loop scheduler.
pub mod scheduler {
    pub use harness_loop::*;
}

/// The append-only event log.
pub mod log {
    pub use harness_log::*;
}

/// SWE-bench task loading.
pub mod bench {
    pub use harness_bench::*;
}

/// Patch filtering and the external container-grader adapter.
pub mod grader {
    pub use harness_grader::*;
}

/// The batch runner: provisioning, the worker pool, and the summary document.
pub mod runner {
    pub use harness_runner::*;
}

/// Native Anthropic Messages-API transport.
#[cfg(feature = "anthropic")]
pub mod anthropic {
    pub use harness_provider_anthropic::*;
}

/// OpenAI-compatible transport (vLLM, Ollama, local servers).
#[cfg(feature = "openai")]
pub mod openai {
    pub use harness_provider_openai::*;
}

/// Common imports for assembling a scheduler and running an experiment.
pub mod prelude {
    pub use harness_context::Context;
    pub use harness_loop::Scheduler;
    pub use harness_log::ExperimentLogger;
    pub use harness_runner::{BatchRunner, LocalDirProvisioner, WorkspaceProvisioner};
    pub use harness_types::{
        CompletionRequest, CompletionResponse, DynProvider, ExperimentConfig, HarnessConfig, LlmConfig, Provider,
        ProviderKind, Task, TaskResult, TerminalReason, TokenUsage,
    };
}
