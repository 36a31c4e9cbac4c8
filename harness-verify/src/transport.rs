//! The object-safe provider wrapper used to pass a model transport into a
//! [`crate::Verifier`] without naming its concrete type.
//!
//! Defined once as `harness_types::DynProvider` (next to `Provider`/
//! `ToolDyn`, the pattern it generalizes) so `harness-recover` can share
//! the exact same trait object type instead of each crate redeclaring its
//! own copy.

pub use harness_types::DynProvider as VerifierTransport;
