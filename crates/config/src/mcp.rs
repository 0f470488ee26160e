use std::collections::BTreeMap;

use serde::Deserialize;
use url::Url;

/// Configuration for the MCP (Model Context Protocol) gateway.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct McpConfig {
    pub enabled: bool,
    pub path: String,
    /// Downstream MCP servers this gateway proxies tools from.
    pub servers: BTreeMap<String, McpServerConfig>,
    /// JSON-RPC methods the gateway forwards to downstream servers. Any
    /// method outside this list is rejected before it reaches the client.
    pub allowed_methods: Vec<String>,
}

impl Default for McpConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/mcp".to_string(),
            servers: BTreeMap::new(),
            allowed_methods: default_allowed_methods(),
        }
    }
}

fn default_allowed_methods() -> Vec<String> {
    ["initialize", "tools/list", "tools/call", "ping"].into_iter().map(str::to_owned).collect()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged, rename_all = "kebab-case", deny_unknown_fields)]
pub enum McpServerConfig {
    Stdio { cmd: Vec<String> },
    Http { uri: Url },
}
