//! Verification result type (§3 Verification result).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The verdict produced by a verifier strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationResult {
    /// Whether verification passed.
    pub passed: bool,
    /// Human-readable verdict message.
    pub message: String,
    /// Structured details (e.g. captured test output, enumerated
    /// requirements).
    #[serde(default)]
    pub details: HashMap<String, serde_json::Value>,
    /// Tokens consumed by the verifier's own model calls (V1/V3), else 0.
    #[serde(default)]
    pub token_cost: u64,
}

impl VerificationResult {
    /// An always-passing result with no details — V0's verdict.
    #[must_use]
    pub fn pass(message: impl Into<String>) -> Self {
        VerificationResult {
            passed: true,
            message: message.into(),
            details: HashMap::new(),
            token_cost: 0,
        }
    }

    /// A failing result with no details.
    #[must_use]
    pub fn fail(message: impl Into<String>) -> Self {
        VerificationResult {
            passed: false,
            message: message.into(),
            details: HashMap::new(),
            token_cost: 0,
        }
    }

    /// The message truncated to `n` chars, for event-log storage (the
    /// event log truncates verification messages to 1000 chars per
    /// `original_source/logging/logger.py`).
    #[must_use]
    pub fn truncated_message(&self, n: usize) -> String {
        if self.message.chars().count() <= n {
            self.message.clone()
        } else {
            self.message.chars().take(n).collect()
        }
    }
}
