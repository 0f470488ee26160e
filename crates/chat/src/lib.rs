//! Chat completion core (component H): fuses the provider registry,
//! catalog, budget, conversation and prompt crates into one
//! `create_completion` operation, dispatching to a vendor's wire format
//! through an adapter and the shared HTTP client in `dispatch`.

mod adapter;
mod dispatch;
mod error;
mod pipeline;
mod request;
mod response;

pub use adapter::{AnthropicAdapter, BedrockAdapter, ChatProvider, GoogleAdapter, OpenAiCompatibleAdapter, adapter_for};
pub use dispatch::{dispatch, dispatch_stream};
pub use error::Error;
pub use pipeline::ChatService;
pub use request::ChatCompletionRequest;
pub use response::{ChatCompletionResponse, StreamChunk, Usage};
