//! Patch filtering, predictions-document generation, and the external
//! container-grader adapter (§4.I).
//!
//! The grader itself — a Docker-based SWE-bench evaluation harness — is an
//! out-of-scope external collaborator (§1): this crate packages the agent's
//! patches into the shape it expects and shells out to it, rather than
//! reimplementing it. Grounded verbatim on
//! `original_source/scripts/docker_eval.py`'s `extract_source_only_patch`,
//! `_is_test_file`, and `build_predictions`.

mod invoke;
mod patch;
mod predictions;

pub use invoke::{run_grader, GraderInvocation, GraderReport};
pub use patch::{extract_source_only_patch, is_test_file};
pub use predictions::{build_predictions, Prediction};
