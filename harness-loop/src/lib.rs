//! The agent-loop scheduler (§4.F) — the harness's core: generate, dispatch
//! tools, verify, recover, repeat until one of nine terminal reasons fires.
//!
//! Grounded on `original_source/agent_verify/harness.py`'s `AgentHarness`.

mod provider_adapter;
mod scheduler;

pub use provider_adapter::SharedProvider;
pub use scheduler::{Scheduler, TASK_COMPLETE_MARKER};
