use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use rmcp::model::{CallToolRequestParam, CallToolResult, Tool};
use rmcp::service::RunningService;
use rmcp::transport::streamable_http_client::StreamableHttpClientTransportConfig;
use rmcp::transport::StreamableHttpClientTransport;
use rmcp::{RoleClient, ServiceExt};
use secrecy::{ExposeSecret, SecretString};

use crate::error::Error;

/// A connection to one remote MCP bridge, reached over streamable HTTP.
/// Unlike the teacher's downstream client this drops stdio transport, TLS
/// client-cert options and the OAuth2 authorization-code flow: the bridge
/// this gateway proxies to is always a single bearer-token-authenticated
/// HTTP endpoint.
#[derive(Clone)]
pub struct DownstreamClient {
    inner: Arc<RunningService<RoleClient, ()>>,
}

impl DownstreamClient {
    pub async fn connect(base_url: &str, bearer_token: Option<&SecretString>) -> Result<Self, Error> {
        let mut builder = reqwest::Client::builder();

        if let Some(token) = bearer_token {
            let mut headers = HeaderMap::new();
            let value = format!("Bearer {}", token.expose_secret());
            headers.insert(AUTHORIZATION, HeaderValue::from_str(&value).map_err(|err| Error::Downstream(err.to_string()))?);
            builder = builder.default_headers(headers);
        }

        let client = builder.build().map_err(|err| Error::Downstream(err.to_string()))?;
        let transport_config = StreamableHttpClientTransportConfig::with_uri(base_url.to_string());
        let transport = StreamableHttpClientTransport::with_client(client, transport_config);

        let service = ().serve(transport).await.map_err(|err| Error::Downstream(err.to_string()))?;

        Ok(Self { inner: Arc::new(service) })
    }

    pub async fn list_tools(&self) -> Result<Vec<Tool>, Error> {
        let result = self.inner.list_tools(Default::default()).await.map_err(|err| Error::Downstream(err.to_string()))?;
        Ok(result.tools)
    }

    pub async fn call_tool(&self, name: &str, arguments: Option<serde_json::Map<String, serde_json::Value>>) -> Result<CallToolResult, Error> {
        let params = CallToolRequestParam { name: name.to_string().into(), arguments };
        self.inner.call_tool(params).await.map_err(|err| Error::Downstream(err.to_string()))
    }
}
