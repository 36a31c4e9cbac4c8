//! Request/response mapping between the harness's provider-agnostic shape
//! and an OpenAI-compatible chat-completions wire format (vLLM, Ollama,
//! and other local servers — §4.C's second transport).
//!
//! Interleaved reasoning (vLLM/Qwen3-style `<think>` content) round-trips
//! through [`ContentBlock::Reasoning`]: an assistant message carrying one
//! is re-sent with a `reasoning` field so the model sees its own prior
//! chain-of-thought, and a response's `reasoning`/`reasoning_content`
//! field is parsed back into the same block type.

use harness_types::{
    CompletionRequest, CompletionResponse, ContentBlock, Message, PricingTable, ProviderError,
    Role, StopReason, ToolDefinition, TokenUsage,
};
use regex::Regex;
use serde_json::{json, Value};
use uuid::Uuid;

fn convert_message(message: &Message) -> Vec<Value> {
    match message.role {
        Role::User => {
            let tool_results: Vec<&ContentBlock> = message
                .content
                .iter()
                .filter(|b| matches!(b, ContentBlock::ToolResult { .. }))
                .collect();

            if !tool_results.is_empty() {
                return tool_results
                    .into_iter()
                    .map(|block| {
                        let ContentBlock::ToolResult { tool_use_id, content, .. } = block else {
                            unreachable!("filtered to ToolResult above")
                        };
                        json!({
                            "role": "tool",
                            "tool_call_id": tool_use_id,
                            "content": content,
                        })
                    })
                    .collect();
            }

            vec![json!({"role": "user", "content": message.text()})]
        }
        Role::Assistant => {
            let mut text_parts = Vec::new();
            let mut tool_calls = Vec::new();
            let mut reasoning: Option<&str> = None;

            for block in &message.content {
                match block {
                    ContentBlock::Text { text } => text_parts.push(text.as_str()),
                    ContentBlock::ToolUse { id, name, input } => {
                        tool_calls.push(json!({
                            "id": id,
                            "type": "function",
                            "function": {"name": name, "arguments": input.to_string()},
                        }));
                    }
                    ContentBlock::Reasoning { text } => reasoning = Some(text.as_str()),
                    ContentBlock::ToolResult { .. } => {}
                }
            }

            let content = if text_parts.is_empty() {
                Value::Null
            } else {
                Value::String(text_parts.join("\n"))
            };
            let mut result = json!({"role": "assistant", "content": content});
            if !tool_calls.is_empty() {
                result["tool_calls"] = json!(tool_calls);
            }
            if let Some(reasoning) = reasoning {
                result["reasoning"] = json!(reasoning);
            }
            vec![result]
        }
    }
}

fn to_openai_tool(tool: &ToolDefinition) -> Value {
    let mut schema = tool.input_schema.clone();
    if let Some(object) = schema.as_object_mut() {
        object.remove("cache_control");
    }
    json!({
        "type": "function",
        "function": {
            "name": tool.name,
            "description": tool.description,
            "parameters": schema,
        },
    })
}

/// Build the OpenAI-compatible chat-completions request body. Never
/// mutates `request`.
pub(crate) fn to_openai_request(request: &CompletionRequest, default_model: &str) -> Value {
    let mut messages = Vec::new();
    if let Some(system) = &request.system {
        messages.push(json!({"role": "system", "content": system}));
    }
    for message in &request.messages {
        messages.extend(convert_message(message));
    }

    let mut body = json!({
        "model": default_model,
        "messages": messages,
        "max_tokens": request.max_tokens.unwrap_or(8192),
        "temperature": request.temperature.unwrap_or(0.6),
    });

    if !request.tools.is_empty() {
        body["tools"] = json!(request.tools.iter().map(to_openai_tool).collect::<Vec<_>>());
    }

    body
}

/// Remove `<think>...</think>` blocks from model output. A safety net for
/// servers that don't split reasoning into its own response field.
fn strip_thinking(text: &str) -> String {
    let re = Regex::new(r"(?s)<think>.*?</think>\s*").expect("valid regex");
    re.replace_all(text, "").trim().to_string()
}

/// Best-effort extraction of a tool call embedded in plain text, for
/// servers/models that ignore native tool calling.
fn try_parse_tool_call_from_text(text: &str, tool_names: &[String]) -> Option<Vec<ContentBlock>> {
    let re = Regex::new(
        r#"(?s)\{[^{}]*"name"\s*:\s*"(\w+)"[^{}]*"(?:input|arguments)"\s*:\s*(\{[^}]*\})[^{}]*\}"#,
    )
    .expect("valid regex");

    let mut content = Vec::new();
    for caps in re.captures_iter(text) {
        let name = &caps[1];
        if !tool_names.iter().any(|n| n == name) {
            continue;
        }
        if let Ok(input) = serde_json::from_str::<Value>(&caps[2]) {
            content.push(ContentBlock::ToolUse {
                id: format!("call_{}", Uuid::new_v4().simple()),
                name: name.to_string(),
                input,
            });
        }
    }
    (!content.is_empty()).then_some(content)
}

/// Parse an OpenAI-compatible chat-completions response body into
/// [`CompletionResponse`]. `tool_names` drives the inline-JSON fallback
/// parse; pass the names offered on the originating request.
pub(crate) fn from_openai_response(
    json: &Value,
    tool_names: &[String],
    pricing: &PricingTable,
) -> Result<CompletionResponse, ProviderError> {
    let choice = json
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .ok_or_else(|| ProviderError::InvalidResponse("missing choices[0]".into()))?;
    let message = choice
        .get("message")
        .ok_or_else(|| ProviderError::InvalidResponse("missing choices[0].message".into()))?;
    let model = json.get("model").and_then(Value::as_str).unwrap_or_default().to_string();

    let reasoning = message
        .get("reasoning")
        .and_then(Value::as_str)
        .or_else(|| message.get("reasoning_content").and_then(Value::as_str))
        .map(str::to_string);

    let raw_text = message.get("content").and_then(Value::as_str).unwrap_or("");
    let text = strip_thinking(raw_text);

    let mut content = Vec::new();
    if !text.is_empty() {
        content.push(ContentBlock::text(text.clone()));
    }

    let native_tool_calls = message
        .get("tool_calls")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    for tool_call in &native_tool_calls {
        let id = tool_call
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("call_{}", Uuid::new_v4().simple()));
        let function = tool_call.get("function").cloned().unwrap_or_else(|| json!({}));
        let name = function.get("name").and_then(Value::as_str).unwrap_or_default().to_string();
        let arguments = function.get("arguments").and_then(Value::as_str).unwrap_or("{}");
        let input = serde_json::from_str(arguments).unwrap_or_else(|_| json!({"raw": arguments}));
        content.push(ContentBlock::ToolUse { id, name, input });
    }

    // Fallback: some models never emit native tool_calls and instead write
    // the call inline as text.
    if native_tool_calls.is_empty() && !tool_names.is_empty() && !text.is_empty()
        && let Some(parsed) = try_parse_tool_call_from_text(&text, tool_names)
    {
        content = parsed;
    }

    if let Some(reasoning) = reasoning {
        content.push(ContentBlock::Reasoning { text: reasoning });
    }

    let stop_reason = match choice.get("finish_reason").and_then(Value::as_str) {
        Some("tool_calls") => StopReason::ToolUse,
        Some("length") => StopReason::MaxTokens,
        _ => StopReason::EndTurn,
    };

    let usage_json = json.get("usage").cloned().unwrap_or_else(|| json!({}));
    let mut usage = TokenUsage {
        input_tokens: usage_json.get("prompt_tokens").and_then(Value::as_u64).unwrap_or(0),
        output_tokens: usage_json.get("completion_tokens").and_then(Value::as_u64).unwrap_or(0),
        cache_creation_tokens: 0,
        cache_read_tokens: 0,
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
