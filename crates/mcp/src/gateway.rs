use std::sync::Arc;

use conversation::ConversationRepository;
use rmcp::model::{CallToolResult, Tool};
use serde_json::{Map, Value};

use crate::description_cache::DescriptionCache;
use crate::downstream::DownstreamClient;
use crate::error::Error;
use crate::methods;
use crate::proxy::ProxiedTool;
use crate::registry::InMemoryToolRegistry;
use crate::tracking::{self, ToolCallHeaders};

/// The tool-calling surface the chat pipeline and background orchestrator
/// talk to: a closed method allow-list in front of a flat registry of
/// built-in and proxied tools, with operator-overridable descriptions and
/// best-effort tool-call tracking.
pub struct McpGateway {
    registry: Arc<InMemoryToolRegistry>,
    descriptions: DescriptionCache,
    conversations: Arc<dyn ConversationRepository>,
}

impl McpGateway {
    pub fn new(registry: Arc<InMemoryToolRegistry>, conversations: Arc<dyn ConversationRepository>) -> Self {
        Self { registry, descriptions: DescriptionCache::new(), conversations }
    }

    pub fn check_method(&self, method: &str) -> Result<(), Error> {
        if methods::is_allowed(method) {
            Ok(())
        } else {
            Err(Error::MethodNotAllowed(method.to_string()))
        }
    }

    /// Connects to a downstream bridge, registering each of its tools as
    /// `<provider>_<original_name>` in the flat registry.
    pub async fn register_downstream(&self, provider: &str, client: DownstreamClient) -> Result<usize, Error> {
        let tools = client.list_tools().await?;
        let count = tools.len();

        for tool in tools {
            let proxied = ProxiedTool::new(provider, tool, client.clone());
            self.registry.register(Arc::new(proxied));
        }

        Ok(count)
    }

    pub fn set_description_override(&self, tool_name: &str, description: String) {
        self.descriptions.set_override(tool_name, description);
    }

    /// `tools/list`: every registered tool's definition, with the operator
    /// override (if any) substituted for the static description.
    pub fn list_tools(&self) -> Vec<Tool> {
        self.registry
            .definitions()
            .into_iter()
            .map(|tool| {
                let static_description = tool.description.as_deref().unwrap_or_default();
                let resolved = self.descriptions.resolve(&tool.name, static_description).into_owned();
                Tool { description: Some(resolved.into()), ..tool }
            })
            .collect()
    }

    /// `tools/call`: dispatches through the registry, then best-effort
    /// reports the outcome back onto the conversation item named by the
    /// tracking headers, when present.
    pub async fn call_tool(&self, name: &str, arguments: Option<Map<String, Value>>, headers: Option<ToolCallHeaders>) -> Result<CallToolResult, Error> {
        let result = self.registry.call(name, arguments).await;

        if let Some(headers) = headers {
            let (succeeded, text) = match &result {
                Ok(result) => (!result.is_error.unwrap_or(false), collect_text(result)),
                Err(err) => (false, err.to_string()),
            };

            tracking::track_completion(&self.conversations, &headers, succeeded, text).await;
        }

        result
    }
}

fn collect_text(result: &CallToolResult) -> String {
    result
        .content
        .iter()
        .filter_map(|content| content.raw.as_text())
        .map(|text_content| text_content.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
