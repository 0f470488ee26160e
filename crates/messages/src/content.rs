use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Container for message content: a plain string for the common case, or a
/// list of typed blocks for multi-modal or tool-bearing messages. Untagged
/// so a plain JSON string deserializes straight into `Text`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentContainer {
    Text(String),
    Blocks(Vec<Content>),
}

impl ContentContainer {
    pub fn is_empty(&self) -> bool {
        match self {
            ContentContainer::Text(text) => text.is_empty(),
            ContentContainer::Blocks(blocks) => blocks.is_empty(),
        }
    }
}

/// A single content block within a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Content {
    /// User-authored text, as submitted to the conversation.
    InputText { text: String },

    /// Model-authored text, as produced by a completion.
    OutputText { text: String },

    /// Model-authored chain-of-thought/reasoning text. Carried separately
    /// from `OutputText` so prompt assembly and budget truncation can treat
    /// it as droppable before visible output text is touched.
    ReasoningText { text: String },

    Image { source: ImageSource, detail: Option<ImageDetail> },

    /// The assistant's request to invoke a tool.
    FunctionCall { id: String, name: String, arguments: Value },

    /// The result of executing a previously requested function call.
    ToolResult { tool_call_id: String, content: ToolResultContent, is_error: Option<bool> },
}

impl Content {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Content::InputText { text } | Content::OutputText { text } | Content::ReasoningText { text } => Some(text),
            _ => None,
        }
    }
}

/// Inline or remote image content.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImageSource {
    Base64 { media_type: String, data: String },
    Url { url: String },
}

/// Rendering fidelity hint, mirroring the vision APIs this passes through
/// to. Missing detail is treated as `High` for token-costing purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageDetail {
    Low,
    High,
}

/// Tool execution output: a single string for the common case, or multiple
/// parts for tools that return structured multi-item results.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolResultContent {
    Text(String),
    Multiple(Vec<String>),
}

impl ToolResultContent {
    pub fn as_text(&self) -> String {
        match self {
            ToolResultContent::Text(text) => text.clone(),
            ToolResultContent::Multiple(parts) => parts.join("\n"),
        }
    }
}
