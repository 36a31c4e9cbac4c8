//! The object-safe provider wrapper R2 needs to issue its compaction call.
//!
//! Shared with `harness-verify` by being defined once as
//! `harness_types::DynProvider`, next to `Provider`/`ToolDyn` — the pattern
//! it generalizes — so neither crate needs to depend on the other just to
//! pass a transport handle around.

pub use harness_types::DynProvider as RecoveryTransport;
