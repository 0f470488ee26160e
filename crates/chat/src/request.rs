use messages::{Message, ToolDefinition};
use serde_json::Value;

/// Input to [`crate::create_completion`]. `model` is whatever the caller
/// sent — alias, provider-prefixed, or bare — and gets resolved against
/// the provider registry and catalog before dispatch.
#[derive(Debug, Clone)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub conversation_id: Option<String>,
    pub stream: bool,
    pub store: bool,
    pub store_reasoning: bool,
    pub tools: Vec<ToolDefinition>,
    pub tool_choice: Option<Value>,
    pub enable_thinking: bool,
    pub deep_research: bool,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl ChatCompletionRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            conversation_id: None,
            stream: false,
            store: false,
            store_reasoning: false,
            tools: Vec::new(),
            tool_choice: None,
            enable_thinking: false,
            deep_research: false,
            temperature: None,
            top_p: None,
            max_tokens: None,
        }
    }
}
