mod anthropic;
mod bedrock;
mod google;
mod openai;

use serde_json::Value;

use crate::error::Error;
use crate::request::ChatCompletionRequest;
use crate::response::{ChatCompletionResponse, StreamChunk};

pub use anthropic::AnthropicAdapter;
pub use bedrock::BedrockAdapter;
pub use google::GoogleAdapter;
pub use openai::OpenAiCompatibleAdapter;

/// Vendor-specific wire translation. One adapter per upstream shape; the
/// HTTP round trip itself (auth header, URL join, status handling) is
/// common and lives in `dispatch`.
pub trait ChatProvider: Send + Sync {
    /// Path appended to the provider's base URL, e.g. `/chat/completions`.
    fn endpoint_path(&self, model: &str) -> String;

    /// Header name carrying the credential (`Authorization` for most,
    /// `x-api-key` for Anthropic).
    fn auth_header_name(&self) -> &'static str;

    fn auth_header_value(&self, credential: &str) -> String;

    fn build_body(&self, request: &ChatCompletionRequest) -> Value;

    fn parse_response(&self, body: &[u8]) -> Result<ChatCompletionResponse, Error>;

    /// Parses one SSE `data:` payload. `None` means "skip" (e.g. a
    /// keep-alive or the `[DONE]` sentinel, which adapters should map to
    /// `Ok(None)` rather than an error).
    fn parse_stream_event(&self, data: &str) -> Option<Result<StreamChunk, Error>>;
}

/// Selects the adapter for a vendor kind. Most aggregators and
/// OpenAI-compatible hosts (OpenRouter, Together, DeepInfra, Groq,
/// Mistral, Cerebras, Fireworks, DeepSeek, XAI, Perplexity, VercelAI, Jan,
/// HuggingFace's TGI-compatible router, Ollama, Cohere's compat endpoint,
/// and any bespoke `Custom` provider) speak the same `/chat/completions`
/// shape and share one adapter; Anthropic, Google and AWS Bedrock each
/// have their own wire format.
pub fn adapter_for(kind: model_key::ProviderKind) -> Box<dyn ChatProvider> {
    use model_key::ProviderKind;

    match kind {
        ProviderKind::Anthropic => Box::new(AnthropicAdapter),
        ProviderKind::Google => Box::new(GoogleAdapter),
        ProviderKind::AwsBedrock => Box::new(BedrockAdapter),
        _ => Box::new(OpenAiCompatibleAdapter),
    }
}
