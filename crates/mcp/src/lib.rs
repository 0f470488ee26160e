//! Tool-calling gateway (component I): a closed JSON-RPC method allow-list
//! guarding a flat registry of built-in and proxied tools, operator-
//! overridable tool descriptions, disallowed-keyword search filtering, and
//! header-driven tool-call tracking back onto the conversation store.

mod deny_filter;
mod description_cache;
mod downstream;
mod error;
mod gateway;
mod methods;
mod proxy;
mod registry;
mod tracking;

pub use deny_filter::{SearchResult, filter as filter_denied_results};
pub use description_cache::DescriptionCache;
pub use downstream::DownstreamClient;
pub use error::Error;
pub use gateway::McpGateway;
pub use methods::is_allowed as is_method_allowed;
pub use proxy::ProxiedTool;
pub use registry::{InMemoryToolRegistry, ToolHandler};
pub use tracking::{ToolCallHeaders, track_completion};
