use messages::{Message, Role};
use serde_json::{Value, json};

use crate::adapter::ChatProvider;
use crate::error::Error;
use crate::request::ChatCompletionRequest;
use crate::response::{ChatCompletionResponse, StreamChunk, Usage};

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// `/v1/messages`-shaped wire format: `system` is a top-level field, not a
/// message in the array, and content is always a typed block list.
pub struct AnthropicAdapter;

impl ChatProvider for AnthropicAdapter {
    fn endpoint_path(&self, _model: &str) -> String {
        "/v1/messages".to_string()
    }

    fn auth_header_name(&self) -> &'static str {
        "x-api-key"
    }

    fn auth_header_value(&self, credential: &str) -> String {
        credential.to_string()
    }

    fn build_body(&self, request: &ChatCompletionRequest) -> Value {
        let system_text = request
            .messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(Message::text)
            .collect::<Vec<_>>()
            .join("\n\n");

        let messages: Vec<Value> = request
            .messages
            .iter()
            .filter(|m| m.role != Role::System)
            .map(|message| {
                let role = if message.role == Role::Assistant { "assistant" } else { "user" };
                json!({"role": role, "content": [{"type": "text", "text": message.text()}]})
            })
            .collect();

        let mut body = json!({
            "model": request.model,
            "messages": messages,
            "max_tokens": request.max_tokens.unwrap_or(4_096),
            "stream": request.stream,
            "anthropic_version": ANTHROPIC_VERSION,
        });

        let object = body.as_object_mut().expect("object literal");

        if !system_text.is_empty() {
            object.insert("system".to_string(), json!(system_text));
        }
        if let Some(temperature) = request.temperature {
            object.insert("temperature".to_string(), json!(temperature));
        }
        if !request.tools.is_empty() {
            object.insert(
                "tools".to_string(),
                json!(request.tools.iter().map(|tool| json!({"name": tool.name, "description": tool.description, "input_schema": tool.parameters})).collect::<Vec<_>>()),
            );
        }

        body
    }

    fn parse_response(&self, body: &[u8]) -> Result<ChatCompletionResponse, Error> {
        let value: Value = serde_json::from_slice(body).map_err(|_| Error::MalformedResponse)?;

        let id = value.get("id").and_then(Value::as_str).unwrap_or_default().to_string();
        let model = value.get("model").and_then(Value::as_str).unwrap_or_default().to_string();

        let text = value
            .get("content")
            .and_then(Value::as_array)
            .map(|blocks| blocks.iter().filter_map(|block| block.get("text").and_then(Value::as_str)).collect::<Vec<_>>().join(""))
            .unwrap_or_default();

        let finish_reason = value.get("stop_reason").and_then(Value::as_str).map(str::to_string);

        let usage = value.get("usage").map(|u| {
            let prompt_tokens = u.get("input_tokens").and_then(Value::as_u64).unwrap_or(0) as u32;
            let completion_tokens = u.get("output_tokens").and_then(Value::as_u64).unwrap_or(0) as u32;
            Usage { prompt_tokens, completion_tokens, total_tokens: prompt_tokens + completion_tokens }
        });

        Ok(ChatCompletionResponse {
            id,
            model,
            message: Message::assistant(text),
            usage,
            finish_reason,
            upstream_error: None,
        })
    }

    fn parse_stream_event(&self, data: &str) -> Option<Result<StreamChunk, Error>> {
        let value: Value = match serde_json::from_str(data) {
            Ok(value) => value,
            Err(_) => return Some(Err(Error::MalformedResponse)),
        };

        match value.get("type").and_then(Value::as_str) {
            Some("content_block_delta") => {
                let delta_text = value.get("delta").and_then(|d| d.get("text")).and_then(Value::as_str).map(str::to_string);
                Some(Ok(StreamChunk { delta_text, finish_reason: None, finished: false }))
            }
            Some("message_delta") => {
                let finish_reason = value.get("delta").and_then(|d| d.get("stop_reason")).and_then(Value::as_str).map(str::to_string);
                Some(Ok(StreamChunk { delta_text: None, finish_reason, finished: false }))
            }
            Some("message_stop") => Some(Ok(StreamChunk { finished: true, ..Default::default() })),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_messages_are_hoisted_out_of_the_array() {
        let request = ChatCompletionRequest::new("claude-3-opus", vec![Message::system("Be terse."), Message::user("hi")]);
        let body = AnthropicAdapter.build_body(&request);

        assert_eq!(body["system"], "Be terse.");
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn parse_response_joins_text_blocks() {
        let body = json!({
            "id": "msg_1",
            "model": "claude-3-opus",
            "content": [{"type": "text", "text": "hello"}, {"type": "text", "text": " there"}],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 5, "output_tokens": 2},
        })
        .to_string();

        let response = AnthropicAdapter.parse_response(body.as_bytes()).unwrap();
        assert_eq!(response.message.text(), "hello there");
        assert_eq!(response.usage.unwrap().total_tokens, 7);
    }

    #[test]
    fn message_stop_event_is_the_finish_signal() {
        let data = json!({"type": "message_stop"}).to_string();
        let chunk = AnthropicAdapter.parse_stream_event(&data).unwrap().unwrap();
        assert!(chunk.finished);
    }
}
