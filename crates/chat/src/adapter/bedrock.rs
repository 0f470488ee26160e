use messages::{Message, Role};
use serde_json::{Value, json};

use crate::adapter::ChatProvider;
use crate::error::Error;
use crate::request::ChatCompletionRequest;
use crate::response::{ChatCompletionResponse, StreamChunk, Usage};

/// Bedrock's Converse API (`messages[].content[].text`, `system`,
/// `inferenceConfig`). Requests to Bedrock need SigV4-signed headers,
/// which this adapter does not produce: there is no SigV4 crate in this
/// workspace's dependency stack, so `dispatch` sends this adapter's
/// output unsigned. Wiring a real signer is left for whoever adds AWS
/// credential support.
pub struct BedrockAdapter;

impl ChatProvider for BedrockAdapter {
    fn endpoint_path(&self, model: &str) -> String {
        format!("/model/{model}/converse")
    }

    fn auth_header_name(&self) -> &'static str {
        "Authorization"
    }

    fn auth_header_value(&self, credential: &str) -> String {
        format!("Bearer {credential}")
    }

    fn build_body(&self, request: &ChatCompletionRequest) -> Value {
        let system_text = request.messages.iter().filter(|m| m.role == Role::System).map(Message::text).collect::<Vec<_>>().join("\n\n");

        let messages: Vec<Value> = request
            .messages
            .iter()
            .filter(|m| m.role != Role::System)
            .map(|message| {
                let role = if message.role == Role::Assistant { "assistant" } else { "user" };
                json!({"role": role, "content": [{"text": message.text()}]})
            })
            .collect();

        let mut body = json!({ "messages": messages });
        let object = body.as_object_mut().expect("object literal");

        if !system_text.is_empty() {
            object.insert("system".to_string(), json!([{"text": system_text}]));
        }

        let mut inference_config = serde_json::Map::new();
        if let Some(temperature) = request.temperature {
            inference_config.insert("temperature".to_string(), json!(temperature));
        }
        if let Some(top_p) = request.top_p {
            inference_config.insert("topP".to_string(), json!(top_p));
        }
        if let Some(max_tokens) = request.max_tokens {
            inference_config.insert("maxTokens".to_string(), json!(max_tokens));
        }
        if !inference_config.is_empty() {
            object.insert("inferenceConfig".to_string(), Value::Object(inference_config));
        }

        body
    }

    fn parse_response(&self, body: &[u8]) -> Result<ChatCompletionResponse, Error> {
        let value: Value = serde_json::from_slice(body).map_err(|_| Error::MalformedResponse)?;

        let text = value
            .get("output")
            .and_then(|o| o.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(Value::as_array)
            .map(|blocks| blocks.iter().filter_map(|block| block.get("text").and_then(Value::as_str)).collect::<Vec<_>>().join(""))
            .unwrap_or_default();

        let finish_reason = value.get("stopReason").and_then(Value::as_str).map(str::to_string);

        let usage = value.get("usage").map(|u| Usage {
            prompt_tokens: u.get("inputTokens").and_then(Value::as_u64).unwrap_or(0) as u32,
            completion_tokens: u.get("outputTokens").and_then(Value::as_u64).unwrap_or(0) as u32,
            total_tokens: u.get("totalTokens").and_then(Value::as_u64).unwrap_or(0) as u32,
        });

        Ok(ChatCompletionResponse {
            id: String::new(),
            model: String::new(),
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

        if let Some(delta) = value.get("contentBlockDelta") {
            let delta_text = delta.get("delta").and_then(|d| d.get("text")).and_then(Value::as_str).map(str::to_string);
            return Some(Ok(StreamChunk { delta_text, finish_reason: None, finished: false }));
        }

        if let Some(stop) = value.get("messageStop") {
            let finish_reason = stop.get("stopReason").and_then(Value::as_str).map(str::to_string);
            return Some(Ok(StreamChunk { delta_text: None, finish_reason, finished: true }));
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_messages_become_a_top_level_system_block() {
        let request = ChatCompletionRequest::new("anthropic.claude-3-sonnet", vec![Message::system("Be terse."), Message::user("hi")]);
        let body = BedrockAdapter.build_body(&request);

        assert_eq!(body["system"][0]["text"], "Be terse.");
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn parse_response_joins_output_message_blocks() {
        let body = json!({
            "output": {"message": {"content": [{"text": "hello"}]}},
            "stopReason": "end_turn",
            "usage": {"inputTokens": 5, "outputTokens": 2, "totalTokens": 7},
        })
        .to_string();

        let response = BedrockAdapter.parse_response(body.as_bytes()).unwrap();
        assert_eq!(response.message.text(), "hello");
        assert_eq!(response.usage.unwrap().total_tokens, 7);
    }

    #[test]
    fn message_stop_event_carries_finish_reason() {
        let data = json!({"messageStop": {"stopReason": "end_turn"}}).to_string();
        let chunk = BedrockAdapter.parse_stream_event(&data).unwrap().unwrap();
        assert!(chunk.finished);
        assert_eq!(chunk.finish_reason.as_deref(), Some("end_turn"));
    }
}
