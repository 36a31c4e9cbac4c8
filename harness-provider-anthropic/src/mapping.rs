//! Request/response mapping between the harness's provider-agnostic shape
//! and the Anthropic Messages API wire format (§4.C native transport).
//!
//! Cache-control placement matches the spec precisely: the system prompt's
//! last block and the tool list's last tool each carry a cache breakpoint,
//! and conversation history carries one more on the *second-to-last*
//! user-role message — so every iteration's one new (assistant, tool_result)
//! pair stays uncached while everything before it remains servable from the
//! provider's prompt cache. `to_api_request` builds an independent
//! `serde_json::Value`; the caller's `Message` list is never mutated (the
//! "defensive copy" from DESIGN.md's Open Question (iii) note).

use harness_types::{
    CompletionRequest, CompletionResponse, ContentBlock, Message, PricingTable, ProviderError,
    Role, StopReason, TokenUsage,
};
use serde_json::{json, Value};

fn cache_control_marker() -> Value {
    json!({"type": "ephemeral"})
}

fn role_str(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Assistant => "assistant",
    }
}

fn block_to_json(block: &ContentBlock) -> Value {
    match block {
        ContentBlock::Text { text } => json!({"type": "text", "text": text}),
        ContentBlock::ToolUse { id, name, input } => {
            json!({"type": "tool_use", "id": id, "name": name, "input": input})
        }
        ContentBlock::ToolResult {
            tool_use_id,
            content,
            is_error,
        } => json!({
            "type": "tool_result",
            "tool_use_id": tool_use_id,
            "content": content,
            "is_error": is_error,
        }),
        ContentBlock::Reasoning { text } => json!({"type": "thinking", "thinking": text}),
    }
}

fn message_to_json(message: &Message) -> Value {
    json!({
        "role": role_str(message.role),
        "content": message.content.iter().map(block_to_json).collect::<Vec<_>>(),
    })
}

/// Set an ephemeral cache breakpoint on the last block of a message's
/// content array, in place.
fn inject_cache_control_on_message(message: &mut Value) {
    if let Some(content) = message.get_mut("content").and_then(Value::as_array_mut)
        && let Some(last) = content.last_mut()
    {
        last["cache_control"] = cache_control_marker();
    }
}

/// Build the Anthropic Messages API request body. Never mutates `request`.
pub(crate) fn to_api_request(request: &CompletionRequest, default_model: &str) -> Value {
    let mut messages: Vec<Value> = request.messages.iter().map(message_to_json).collect();

    let user_indices: Vec<usize> = request
        .messages
        .iter()
        .enumerate()
        .filter(|(_, m)| m.role == Role::User)
        .map(|(i, _)| i)
        .collect();
    if user_indices.len() >= 2 {
        let target = user_indices[user_indices.len() - 2];
        inject_cache_control_on_message(&mut messages[target]);
    }

    let mut body = json!({
        "model": default_model,
        "messages": messages,
        "max_tokens": request.max_tokens.unwrap_or(8192),
    });

    if let Some(temperature) = request.temperature {
        body["temperature"] = json!(temperature);
    }

    if let Some(system) = &request.system {
        let mut system_block = json!({"type": "text", "text": system});
        system_block["cache_control"] = cache_control_marker();
        body["system"] = json!([system_block]);
    }

    if !request.tools.is_empty() {
        let mut tools: Vec<Value> = request
            .tools
            .iter()
            .map(|tool| {
                json!({
                    "name": tool.name,
                    "description": tool.description,
                    "input_schema": tool.input_schema,
                })
            })
            .collect();
        if let Some(last) = tools.last_mut() {
            last["cache_control"] = cache_control_marker();
        }
        body["tools"] = json!(tools);
    }

    body
}

fn parse_stop_reason(raw: Option<&str>) -> StopReason {
    match raw {
        Some("tool_use") => StopReason::ToolUse,
        Some("max_tokens") => StopReason::MaxTokens,
        // "end_turn", "stop_sequence", and any other/unknown reason are
        // treated as a final response — the spec's closed three-variant
        // set has no room for Anthropic's other terminal reasons.
        _ => StopReason::EndTurn,
    }
}

/// Parse an Anthropic Messages API response body into [`CompletionResponse`].
pub(crate) fn from_api_response(
    json: &Value,
    pricing: &PricingTable,
) -> Result<CompletionResponse, ProviderError> {
    let model = json
        .get("model")
        .and_then(Value::as_str)
        .ok_or_else(|| ProviderError::InvalidResponse("missing \"model\"".into()))?
        .to_string();

    let raw_content = json
        .get("content")
        .and_then(Value::as_array)
        .ok_or_else(|| ProviderError::InvalidResponse("missing \"content\" array".into()))?;

    let mut content = Vec::with_capacity(raw_content.len());
    for block in raw_content {
        match block.get("type").and_then(Value::as_str) {
            Some("text") => {
                let text = block.get("text").and_then(Value::as_str).unwrap_or_default();
                content.push(ContentBlock::text(text));
            }
            Some("tool_use") => {
                let id = block.get("id").and_then(Value::as_str).unwrap_or_default().to_string();
                let name = block.get("name").and_then(Value::as_str).unwrap_or_default().to_string();
                let input = block.get("input").cloned().unwrap_or_else(|| json!({}));
                content.push(ContentBlock::ToolUse { id, name, input });
            }
            Some("thinking") => {
                let text = block.get("thinking").and_then(Value::as_str).unwrap_or_default();
                content.push(ContentBlock::Reasoning { text: text.to_string() });
            }
            // Redacted-thinking and other future block types carry no
            // user- or model-facing text we can round-trip; skip them.
            _ => {}
        }
    }

    let stop_reason = parse_stop_reason(json.get("stop_reason").and_then(Value::as_str));

    let usage_json = json.get("usage").cloned().unwrap_or_else(|| json!({}));
    let mut usage = TokenUsage {
        input_tokens: usage_json.get("input_tokens").and_then(Value::as_u64).unwrap_or(0),
        output_tokens: usage_json.get("output_tokens").and_then(Value::as_u64).unwrap_or(0),
        cache_creation_tokens: usage_json
            .get("cache_creation_input_tokens")
            .and_then(Value::as_u64)
            .unwrap_or(0),
        cache_read_tokens: usage_json
            .get("cache_read_input_tokens")
            .and_then(Value::as_u64)
            .unwrap_or(0),
        cost_usd: Default::default(),
    };
    usage.cost_usd = pricing.cost_for(&model, &usage);

    Ok(CompletionResponse {
        content,
        stop_reason,
        usage,
        model,
    })
}
