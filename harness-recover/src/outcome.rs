//! The result of a recovery strategy's [`crate::RecoveryStrategy::recover`] call.

use harness_context::Context;

/// Whether a recovery strategy mutated its context in place or built a new
/// one, per §4.E. Python distinguishes these cases by reference identity of
/// the returned object; Rust's ownership rules make that awkward, so this
/// is the tagged-pair alternative the spec itself allows.
#[derive(Debug)]
pub enum RecoveryOutcome {
    /// The context passed to `recover` was mutated in place (R1, or R2
    /// degrading to R1 behavior without a transport). The caller keeps
    /// using its existing `Context`.
    Mutated,
    /// A new context replaces the one passed to `recover` (R2 with a
    /// transport, R3). The caller should resume the scheduler on this
    /// context instead.
    Replaced(Context),
}
