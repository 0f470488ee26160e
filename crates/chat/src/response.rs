use messages::Message;

#[derive(Debug, Clone, Default)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, Clone)]
pub struct ChatCompletionResponse {
    pub id: String,
    pub model: String,
    pub message: Message,
    pub usage: Option<Usage>,
    pub finish_reason: Option<String>,
    /// Set only when this response is the degraded fallback reply, to the
    /// upstream error that triggered it. `None` on a genuine model reply.
    pub upstream_error: Option<String>,
}

/// One piece of a streamed completion. A `[DONE]` terminator is
/// represented by `finished: true` rather than a sentinel chunk, so a
/// caller building an SSE response can synthesize its own final frame.
#[derive(Debug, Clone, Default)]
pub struct StreamChunk {
    pub delta_text: Option<String>,
    pub finish_reason: Option<String>,
    pub finished: bool,
}
