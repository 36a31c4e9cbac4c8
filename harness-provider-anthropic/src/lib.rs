//! Native Anthropic Messages API transport (§4.C).
//!
//! This is the harness's primary model transport: it speaks the Messages
//! API directly rather than through an OpenAI-compatible shim, which is
//! what lets it place prompt-cache breakpoints precisely (see
//! [`mapping`]'s module docs).

mod client;
mod error;
mod mapping;

pub use client::Anthropic;
