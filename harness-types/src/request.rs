//! The provider-agnostic completion request/response shape (§4.C), token
//! usage accounting, and the per-model pricing table (§3 Usage).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::content::Message;

/// A tool schema as presented to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// JSON Schema for the tool's input.
    pub input_schema: serde_json::Value,
}

/// Request sent to a model transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Conversation messages (system prompt excluded — see `system`).
    pub messages: Vec<Message>,
    /// Static system prompt, if any.
    pub system: Option<String>,
    /// Tool schemas available this turn.
    pub tools: Vec<ToolDefinition>,
    /// Maximum output tokens.
    pub max_tokens: Option<u32>,
    /// Sampling temperature.
    pub temperature: Option<f64>,
}

/// Why the provider stopped generating. A closed three-variant set — both
/// transports normalize into this (§4.C).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The model produced a final response.
    EndTurn,
    /// The model wants to use one or more tools.
    ToolUse,
    /// The response was cut off at `max_tokens`.
    MaxTokens,
}

/// Token/cost usage from a single transport call, or a cumulative
/// aggregate across a whole run (§3 Usage).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Plain (non-cached) input tokens.
    pub input_tokens: u64,
    /// Output tokens generated.
    pub output_tokens: u64,
    /// Input tokens written to the provider's prompt cache.
    pub cache_creation_tokens: u64,
    /// Input tokens served from the provider's prompt cache.
    pub cache_read_tokens: u64,
    /// Cumulative cost in USD, computed from the pricing table.
    pub cost_usd: Decimal,
}

impl TokenUsage {
    /// `plain + cache_creation + cache_read` — the testable-property
    /// invariant of §8.
    #[must_use]
    pub fn total_input(&self) -> u64 {
        self.input_tokens + self.cache_creation_tokens + self.cache_read_tokens
    }

    /// `cache_read / total_input`, or 0 when there is no input yet.
    #[must_use]
    pub fn cache_hit_rate(&self) -> f64 {
        let total = self.total_input();
        if total == 0 {
            0.0
        } else {
            self.cache_read_tokens as f64 / total as f64
        }
    }

    /// Add another usage delta into this one in place. Used both by the
    /// context (`add`) and by recovery strategies that inherit cumulative
    /// counters across a recursion.
    pub fn accumulate(&mut self, delta: &TokenUsage) {
        self.input_tokens += delta.input_tokens;
        self.output_tokens += delta.output_tokens;
        self.cache_creation_tokens += delta.cache_creation_tokens;
        self.cache_read_tokens += delta.cache_read_tokens;
        self.cost_usd += delta.cost_usd;
    }
}

/// Response from a model transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Response content blocks, in order.
    pub content: Vec<crate::content::ContentBlock>,
    /// Why the provider stopped.
    pub stop_reason: StopReason,
    /// Usage for this call only (not cumulative).
    pub usage: TokenUsage,
    /// The model identifier actually used.
    pub model: String,
}

impl CompletionResponse {
    /// Concatenated text content, ignoring tool_use/tool_result/reasoning
    /// blocks — the "convenience text-content concatenation" of §4.C.
    #[must_use]
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(crate::content::ContentBlock::as_text)
            .collect::<Vec<_>>()
            .join("")
    }

    /// All tool_use blocks in this response, in order.
    #[must_use]
    pub fn tool_uses(&self) -> Vec<(&str, &str, &serde_json::Value)> {
        self.content
            .iter()
            .filter_map(|block| match block {
                crate::content::ContentBlock::ToolUse { id, name, input } => {
                    Some((id.as_str(), name.as_str(), input))
                }
                _ => None,
            })
            .collect()
    }
}

/// Per-million-token pricing for one model.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModelPricing {
    /// USD per million plain input tokens.
    pub input: f64,
    /// USD per million output tokens.
    pub output: f64,
    /// USD per million cache-write (cache-creation) input tokens.
    pub cache_write: f64,
    /// USD per million cache-read input tokens.
    pub cache_read: f64,
}

/// A table of per-model pricing, defaulting unknown models to zero cost.
///
/// Values are from `original_source/llm/base.py`'s `PRICING` table.
#[derive(Debug, Clone)]
pub struct PricingTable {
    models: HashMap<String, ModelPricing>,
}

impl PricingTable {
    /// The harness's built-in pricing table.
    #[must_use]
    pub fn default_table() -> Self {
        let mut models = HashMap::new();
        models.insert(
            "claude-sonnet-4-6".to_string(),
            ModelPricing {
                input: 3.00,
                output: 15.00,
                cache_write: 3.75,
                cache_read: 0.30,
            },
        );
        models.insert(
            "claude-opus-4-6".to_string(),
            ModelPricing {
                input: 15.00,
                output: 75.00,
                cache_write: 18.75,
                cache_read: 1.50,
            },
        );
        models.insert(
            "gpt-4o".to_string(),
            ModelPricing {
                input: 2.50,
                output: 10.00,
                cache_write: 2.50,
                cache_read: 1.25,
            },
        );
        PricingTable { models }
    }

    /// Pricing for `model`, or all-zero if unrecognized.
    #[must_use]
    pub fn pricing_for(&self, model: &str) -> ModelPricing {
        self.models.get(model).copied().unwrap_or_default()
    }

    /// Compute the USD cost of one call's usage under this table.
    #[must_use]
    pub fn cost_for(&self, model: &str, usage: &TokenUsage) -> Decimal {
        let pricing = self.pricing_for(model);
        let million = Decimal::from(1_000_000u32);
        let cost = Decimal::from(usage.input_tokens) * Decimal::try_from(pricing.input).unwrap_or_default()
            + Decimal::from(usage.output_tokens) * Decimal::try_from(pricing.output).unwrap_or_default()
            + Decimal::from(usage.cache_creation_tokens)
                * Decimal::try_from(pricing.cache_write).unwrap_or_default()
            + Decimal::from(usage.cache_read_tokens) * Decimal::try_from(pricing.cache_read).unwrap_or_default();
        cost / million
    }
}

impl Default for PricingTable {
    fn default() -> Self {
        Self::default_table()
    }
}
