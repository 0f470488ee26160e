use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use rmcp::model::{CallToolResult, Tool};
use serde_json::{Map, Value};

use crate::error::Error;

/// One built-in or proxied tool. Implementors of built-in tools (web
/// search/scrape, file index/query, sandboxed code execution, read-only
/// memory retrieval, image generation, shell/file/browser primitives) and
/// `proxy::ProxiedTool` both satisfy this.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    fn definition(&self) -> Tool;

    /// Code-execution-style tools only run when the caller's arguments
    /// carry `"approved": true`; every other tool ignores the flag.
    fn requires_approval(&self) -> bool {
        false
    }

    async fn call(&self, arguments: Map<String, Value>) -> Result<CallToolResult, Error>;
}

#[derive(Default)]
pub struct InMemoryToolRegistry {
    tools: DashMap<String, Arc<dyn ToolHandler>>,
}

impl InMemoryToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, tool: Arc<dyn ToolHandler>) {
        self.tools.insert(tool.definition().name.to_string(), tool);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn ToolHandler>> {
        self.tools.get(name).map(|entry| entry.clone())
    }

    pub fn definitions(&self) -> Vec<Tool> {
        self.tools.iter().map(|entry| entry.definition()).collect()
    }

    /// Looks up `name` and dispatches `arguments`, enforcing the
    /// approval gate for tools that require it.
    pub async fn call(&self, name: &str, arguments: Option<Map<String, Value>>) -> Result<CallToolResult, Error> {
        let tool = self.get(name).ok_or_else(|| Error::ToolNotFound(name.to_string()))?;
        let arguments = arguments.unwrap_or_default();

        if tool.requires_approval() {
            let approved = arguments.get("approved").and_then(Value::as_bool).unwrap_or(false);
            if !approved {
                return Err(Error::ApprovalRequired(name.to_string()));
            }
        }

        tool.call(arguments).await
    }
}

#[cfg(test)]
mod tests {
    use rmcp::model::Content;

    use super::*;

    struct EchoTool;

    #[async_trait]
    impl ToolHandler for EchoTool {
        fn definition(&self) -> Tool {
            Tool {
                name: "echo".into(),
                description: Some("Echoes its input".into()),
                input_schema: Arc::new(Map::new()),
                output_schema: None,
                annotations: None,
                title: None,
                icons: None,
            }
        }

        async fn call(&self, arguments: Map<String, Value>) -> Result<CallToolResult, Error> {
            let text = arguments.get("text").and_then(Value::as_str).unwrap_or_default();
            Ok(CallToolResult::success(vec![Content::text(text.to_string())]))
        }
    }

    struct GatedTool;

    #[async_trait]
    impl ToolHandler for GatedTool {
        fn definition(&self) -> Tool {
            Tool {
                name: "run_code".into(),
                description: Some("Executes sandboxed code".into()),
                input_schema: Arc::new(Map::new()),
                output_schema: None,
                annotations: None,
                title: None,
                icons: None,
            }
        }

        fn requires_approval(&self) -> bool {
            true
        }

        async fn call(&self, _arguments: Map<String, Value>) -> Result<CallToolResult, Error> {
            Ok(CallToolResult::success(vec![Content::text("ran")]))
        }
    }

    #[tokio::test]
    async fn unknown_tool_is_rejected() {
        let registry = InMemoryToolRegistry::new();
        let err = registry.call("missing", None).await.unwrap_err();
        assert!(matches!(err, Error::ToolNotFound(_)));
    }

    #[tokio::test]
    async fn registered_tool_dispatches() {
        let registry = InMemoryToolRegistry::new();
        registry.register(Arc::new(EchoTool));

        let mut arguments = Map::new();
        arguments.insert("text".to_string(), Value::String("hi".to_string()));

        let result = registry.call("echo", Some(arguments)).await.unwrap();
        assert!(!result.content.is_empty());
    }

    #[tokio::test]
    async fn gated_tool_rejects_without_approval() {
        let registry = InMemoryToolRegistry::new();
        registry.register(Arc::new(GatedTool));

        let err = registry.call("run_code", None).await.unwrap_err();
        assert!(matches!(err, Error::ApprovalRequired(_)));
    }

    #[tokio::test]
    async fn gated_tool_runs_once_approved() {
        let registry = InMemoryToolRegistry::new();
        registry.register(Arc::new(GatedTool));

        let mut arguments = Map::new();
        arguments.insert("approved".to_string(), Value::Bool(true));

        let result = registry.call("run_code", Some(arguments)).await.unwrap();
        assert!(!result.content.is_empty());
    }
}
