use async_trait::async_trait;
use rmcp::model::{CallToolResult, Content, Tool};
use serde_json::{Map, Value};

use crate::downstream::DownstreamClient;
use crate::error::Error;
use crate::registry::ToolHandler;

/// A downstream tool re-exposed under `<provider>_<original_name>`, so
/// tools from different bridges never collide in the flat registry
/// namespace. Calls are forwarded verbatim; the downstream's content
/// blocks are collapsed into a single text block for the caller.
pub struct ProxiedTool {
    provider: String,
    original_name: String,
    description: Option<String>,
    input_schema: std::sync::Arc<Map<String, Value>>,
    client: DownstreamClient,
}

impl ProxiedTool {
    pub fn new(provider: impl Into<String>, upstream: Tool, client: DownstreamClient) -> Self {
        Self {
            provider: provider.into(),
            original_name: upstream.name.to_string(),
            description: upstream.description.map(|d| d.to_string()),
            input_schema: upstream.input_schema,
            client,
        }
    }

    pub fn proxied_name(&self) -> String {
        proxied_tool_name(&self.provider, &self.original_name)
    }
}

fn proxied_tool_name(provider: &str, original_name: &str) -> String {
    format!("{provider}_{original_name}")
}

#[async_trait]
impl ToolHandler for ProxiedTool {
    fn definition(&self) -> Tool {
        Tool {
            name: self.proxied_name().into(),
            description: self.description.clone().map(Into::into),
            input_schema: self.input_schema.clone(),
            output_schema: None,
            annotations: None,
            title: None,
            icons: None,
        }
    }

    async fn call(&self, arguments: Map<String, Value>) -> Result<CallToolResult, Error> {
        let result = self.client.call_tool(&self.original_name, Some(arguments)).await?;
        Ok(collapse_to_text(result))
    }
}

/// Joins every text content block the downstream returned into one, since
/// callers of this gateway only ever consume a single text result per call.
fn collapse_to_text(result: CallToolResult) -> CallToolResult {
    let text: String = result
        .content
        .iter()
        .filter_map(|content| content.raw.as_text())
        .map(|text_content| text_content.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    if result.is_error.unwrap_or(false) {
        CallToolResult::error(vec![Content::text(text)])
    } else {
        CallToolResult::success(vec![Content::text(text)])
    }
}
