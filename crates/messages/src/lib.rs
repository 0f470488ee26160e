//! Protocol-agnostic chat message types.
//!
//! Every provider in `providers` speaks its own wire format. The rest of the
//! gateway — budget estimation, conversation storage, prompt assembly, the
//! MCP tool-calling loop — works with [`Message`] and [`Content`] instead, so
//! a provider module is the only place that needs to know what OpenAI's or
//! Anthropic's JSON actually looks like.

mod content;
mod role;
mod tool;

pub use content::{Content, ContentContainer, ImageDetail, ImageSource, ToolResultContent};
pub use role::Role;
pub use tool::{ToolCall, ToolDefinition};

use serde::{Deserialize, Serialize};

/// A single turn in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: ContentContainer,

    /// Tool calls requested by the assistant. Derivable from `content`'s
    /// `FunctionCall` blocks; kept alongside for OpenAI-shaped providers
    /// that carry it as a sibling field rather than inline content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,

    /// For a `Role::Tool` message, the id of the function call it answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self { role: Role::User, content: ContentContainer::Text(text.into()), tool_calls: None, tool_call_id: None }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: ContentContainer::Text(text.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self { role: Role::System, content: ContentContainer::Text(text.into()), tool_calls: None, tool_call_id: None }
    }

    /// Concatenated text of every text-bearing content block, ignoring
    /// images and tool call/result blocks. Used for token estimation and for
    /// JSON-aware truncation's leaf boundaries.
    pub fn text(&self) -> String {
        match &self.content {
            ContentContainer::Text(text) => text.clone(),
            ContentContainer::Blocks(blocks) => blocks.iter().filter_map(Content::as_text).collect::<Vec<_>>().join(""),
        }
    }

    /// Whether this message carries any image content part.
    pub fn has_images(&self) -> bool {
        matches!(&self.content, ContentContainer::Blocks(blocks) if blocks.iter().any(|c| matches!(c, Content::Image { .. })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_concatenates_blocks() {
        let message = Message {
            role: Role::Assistant,
            content: ContentContainer::Blocks(vec![
                Content::OutputText { text: "part one".into() },
                Content::OutputText { text: " part two".into() },
            ]),
            tool_calls: None,
            tool_call_id: None,
        };

        assert_eq!(message.text(), "part one part two");
    }

    #[test]
    fn simple_text_container_roundtrips_through_json() {
        let message = Message::user("hello");
        let json = serde_json::to_string(&message).unwrap();
        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(back.text(), "hello");
    }
}
