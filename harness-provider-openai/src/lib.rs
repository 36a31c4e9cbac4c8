//! OpenAI-compatible model transport (§4.C) for vLLM, Ollama, and other
//! local servers, including interleaved-reasoning round-tripping and an
//! inline-JSON tool-call fallback for models that ignore native tool
//! calling.

mod client;
mod error;
mod mapping;

pub use client::OpenAiCompat;
