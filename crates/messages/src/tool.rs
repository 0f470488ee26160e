use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A tool the model may call, as advertised to the provider in the request.
/// MCP tool definitions (component I) are converted into these before being
/// merged into a chat completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON Schema describing the accepted arguments.
    pub parameters: Value,
}

/// A tool invocation requested by the assistant, mirrored onto
/// `Content::FunctionCall` blocks and exposed as a sibling field for
/// OpenAI-shaped providers that carry it separately from content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: Value,
}
