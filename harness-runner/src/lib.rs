//! The batch runner (§4.G): workspace provisioning, a bounded worker pool
//! fanning scheduler invocations out across tasks and trials, and the
//! experiment summary document.

mod provisioner;
mod runner;
mod summary;
mod transport;

pub use provisioner::{LocalDirProvisioner, WorkspaceProvisioner};
pub use runner::{BatchRunner, DEFAULT_WORKER_POOL_WIDTH};
pub use summary::{build_summary, ResultRow, Summary};
pub use transport::build_transport;
