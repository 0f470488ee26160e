//! `POST /v1/mcp`: JSON-RPC 2.0, method checked against the closed
//! allow-list and against `config::McpConfig::allowed_methods`.

use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use http::{HeaderMap, StatusCode};
use mcp::ToolCallHeaders;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
    #[serde(default)]
    pub id: Value,
}

pub async fn handle(State(state): State<AppState>, headers: HeaderMap, Json(request): Json<JsonRpcRequest>) -> Response {
    if !state.mcp_config.allowed_methods.iter().any(|allowed| allowed == &request.method) {
        return rpc_error(request.id, -32601, format!("method {} is not permitted by configuration", request.method));
    }

    if let Err(err) = state.mcp.check_method(&request.method) {
        return rpc_error(request.id, err.rpc_code(), err.to_string());
    }

    match request.method.as_str() {
        "initialize" => rpc_result(request.id, json!({ "protocolVersion": "2024-11-05", "capabilities": { "tools": {} } })),
        "ping" => rpc_result(request.id, json!({})),
        "tools/list" => {
            let tools = state.mcp.list_tools();
            rpc_result(request.id, json!({ "tools": tools }))
        }
        "tools/call" => call_tool(&state, &headers, request).await,
        other => rpc_error(request.id, -32601, format!("method {other} has no handler")),
    }
}

async fn call_tool(state: &AppState, headers: &HeaderMap, request: JsonRpcRequest) -> Response {
    let Some(name) = request.params.get("name").and_then(Value::as_str).map(str::to_owned) else {
        return rpc_error(request.id, -32602, "missing required \"name\" parameter".to_string());
    };

    let arguments = request.params.get("arguments").and_then(Value::as_object).cloned();
    let call_headers = ToolCallHeaders::extract(headers);

    match state.mcp.call_tool(&name, arguments, call_headers).await {
        Ok(result) => rpc_result(request.id, serde_json::to_value(result).unwrap_or(Value::Null)),
        Err(err) => rpc_error(request.id, err.rpc_code(), err.to_string()),
    }
}

fn rpc_result(id: Value, result: Value) -> Response {
    (StatusCode::OK, Json(json!({ "jsonrpc": "2.0", "id": id, "result": result }))).into_response()
}

fn rpc_error(id: Value, code: i64, message: String) -> Response {
    (StatusCode::OK, Json(json!({ "jsonrpc": "2.0", "id": id, "error": { "code": code, "message": message } }))).into_response()
}
