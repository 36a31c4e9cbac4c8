//! Conversation content: roles, content blocks, and messages.

use serde::{Deserialize, Serialize};

/// Role of a message author in a conversation context.
///
/// The system prompt is *not* a message role here — it travels as a
/// separate field on [`crate::request::CompletionRequest`], matching the
/// native transport's "system" top-level key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A human/task-originated message, including tool results (tool
    /// results are wrapped as user-role messages per §3 Context).
    User,
    /// A model-originated message.
    Assistant,
}

/// A single content block within a message.
///
/// [`ContentBlock::Reasoning`] is transport-private: it must round-trip
/// across turns so a provider sees its own prior chain-of-thought, but it
/// is never shown to a user and is skipped by text-facing operations like
/// [`Message::text`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Plain text.
    Text {
        /// The text content.
        text: String,
    },
    /// A tool invocation requested by the model.
    ToolUse {
        /// Unique identifier for this tool use, referenced by the
        /// matching `ToolResult`.
        id: String,
        /// Name of the tool to invoke.
        name: String,
        /// Structured tool arguments.
        input: serde_json::Value,
    },
    /// The result of executing a tool.
    ToolResult {
        /// The `tool_use` id this result answers.
        tool_use_id: String,
        /// Stringified tool output (already truncated for the audit log,
        /// but carrying the full content for the model — see
        /// `harness-tool`'s truncation discipline).
        content: String,
        /// Whether the tool execution errored.
        is_error: bool,
    },
    /// Transport-private reasoning/chain-of-thought content.
    Reasoning {
        /// The reasoning text, as emitted by the provider.
        text: String,
    },
}

impl ContentBlock {
    /// Convenience constructor for a text block.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::Text { text: text.into() }
    }

    /// The block's text, if it's a [`ContentBlock::Text`].
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentBlock::Text { text } => Some(text.as_str()),
            _ => None,
        }
    }
}

/// A single message in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Author role.
    pub role: Role,
    /// Ordered content blocks.
    pub content: Vec<ContentBlock>,
}

impl Message {
    /// Build a user message carrying a single text block.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Message {
            role: Role::User,
            content: vec![ContentBlock::text(text)],
        }
    }

    /// Build an assistant message from a full content-block list.
    #[must_use]
    pub fn assistant(content: Vec<ContentBlock>) -> Self {
        Message {
            role: Role::Assistant,
            content,
        }
    }

    /// Build a user message wrapping a single tool_result block — the
    /// canonical way tool results re-enter the conversation (§4.A).
    #[must_use]
    pub fn tool_result(tool_use_id: impl Into<String>, content: impl Into<String>, is_error: bool) -> Self {
        Message {
            role: Role::User,
            content: vec![ContentBlock::ToolResult {
                tool_use_id: tool_use_id.into(),
                content: content.into(),
                is_error,
            }],
        }
    }

    /// Concatenate all `Text` blocks, skipping tool-use/tool-result/reasoning.
    #[must_use]
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(ContentBlock::as_text)
            .collect::<Vec<_>>()
            .join("")
    }

    /// All `ToolUse` blocks in this message, in order.
    #[must_use]
    pub fn tool_uses(&self) -> Vec<(&str, &str, &serde_json::Value)> {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::ToolUse { id, name, input } => {
                    Some((id.as_str(), name.as_str(), input))
                }
                _ => None,
            })
            .collect()
    }
}
